//! Command-line arguments for the exchange-rate lookup tool.
use std::time::Duration;

use chat_common::command::MAX_DAYS;
use chat_server::rates::aggregator::DEFAULT_MAX_IN_FLIGHT;
use chat_server::rates::privatbank::DEFAULT_BASE_URL;
use clap::Parser;
use clap::builder::TypedValueParser;

/// Print PrivatBank archive rates for a few currencies over the last days.
#[derive(Debug, Parser)]
#[command(name = "exchange_rates", version, about, long_about = None)]
pub struct Args {
    /// Currency codes to look up, e.g. `USD EUR`.
    #[arg(required = true, num_args = 1..)]
    pub currencies: Vec<String>,

    /// Number of days counting back from today; values above 10 are capped.
    #[arg(long, short, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub days: u32,

    /// Base URL of the exchange-rate archive API.
    #[arg(long, env = "CHAT_RATES_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Upper bound for concurrent requests to the rate API.
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_IN_FLIGHT,
        value_parser = clap::value_parser!(u16).range(1..).map(usize::from)
    )]
    pub max_in_flight: usize,

    /// Timeout of a single rate API request, in seconds.
    #[arg(long, default_value_t = 10)]
    pub request_timeout_secs: u64,
}

impl Args {
    pub fn days(&self) -> u32 {
        self.days.min(MAX_DAYS)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
