//! PrivatBank public archive API client.
//!
//! One `GET {base_url}?json&date=dd.mm.yyyy` per lookup. The response lists every
//! currency quoted that day; the client picks the requested one:
//!
//! ```json
//! {"date":"01.12.2023","exchangeRate":[
//!   {"baseCurrency":"UAH","currency":"USD","saleRateNB":36.5686,"purchaseRateNB":36.5686}
//! ]}
//! ```
//!
//! No retries: a failed request surfaces as a [`LookupError`] for that pair only.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use super::{LookupError, RateSource, format_date};

/// Production endpoint of the archive API.
pub const DEFAULT_BASE_URL: &str = "https://api.privatbank.ua/p24api/exchange_rates";

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    #[serde(rename = "exchangeRate", default)]
    exchange_rate: Vec<ArchiveEntry>,
}

#[derive(Debug, Deserialize)]
struct ArchiveEntry {
    #[serde(default)]
    currency: Option<String>,
    #[serde(rename = "saleRateNB", default)]
    sale_rate_nb: Option<serde_json::Number>,
}

/// HTTP client for the archive API.
#[derive(Debug, Clone)]
pub struct PrivatBankClient {
    client: Client,
    base_url: String,
}

impl PrivatBankClient {
    /// Build a client with a per-request `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LookupError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, date: &str) -> String {
        format!("{}?json&date={}", self.base_url, date)
    }
}

#[async_trait]
impl RateSource for PrivatBankClient {
    fn name(&self) -> &str {
        "privatbank"
    }

    async fn fetch_rate(&self, currency: &str, date: NaiveDate) -> Result<String, LookupError> {
        let date = format_date(date);
        let url = self.url(&date);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Http {
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        parse_sale_rate(&body, currency, &date)
    }
}

/// Extract the sale rate of `currency` from an archive response body.
///
/// Currency codes are compared ASCII case-insensitively.
pub fn parse_sale_rate(body: &str, currency: &str, date: &str) -> Result<String, LookupError> {
    let response: ArchiveResponse = serde_json::from_str(body)?;
    response
        .exchange_rate
        .into_iter()
        .filter(|entry| {
            entry
                .currency
                .as_deref()
                .is_some_and(|code| code.eq_ignore_ascii_case(currency))
        })
        .find_map(|entry| entry.sale_rate_nb)
        .map(|rate| rate.to_string())
        .ok_or_else(|| LookupError::NotFound {
            currency: currency.to_string(),
            date: date.to_string(),
        })
}
