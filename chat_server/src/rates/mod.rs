//! Historical exchange-rate lookups.
//!
//! - `privatbank` — the HTTP client for the upstream archive API.
//! - `aggregator` — concurrent fan-out over currencies and days with ordered results.
//!
//! Both sides meet at the [`RateSource`] trait so the aggregator and the router can
//! run against a stub in tests.

pub mod aggregator;
pub mod privatbank;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

pub use aggregator::{CurrencyRates, DatedRate, RateAggregator, RateResult};
pub use privatbank::PrivatBankClient;

/// Date format expected by the upstream API and used in replies.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Render `date` as `dd.mm.yyyy`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Failure of a single `(currency, date)` lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The upstream answered with a non-2xx status.
    #[error("HTTP status {status}")]
    Http { status: u16 },

    /// The response parsed but had no sale rate for the currency.
    #[error("currency {currency} not found for {date}")]
    NotFound { currency: String, date: String },

    /// The response body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Connection, TLS or timeout failure before a response was read.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Source of one currency's sale rate for one calendar day.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    /// Fetch the sale rate of `currency` on `date`, as the upstream renders it.
    async fn fetch_rate(&self, currency: &str, date: NaiveDate) -> Result<String, LookupError>;
}
