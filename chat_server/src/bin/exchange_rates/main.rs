//! Exchange Rates — one-shot lookup of PrivatBank archive rates, no chat server needed.
//!
//! Runs the same aggregation and prints the same text as the chat server's
//! `exchange` command.
//!
//! Usage example (CLI):
//! ```bash
//! exchange_rates --days 3 USD EUR
//! ```
mod args;

use std::sync::Arc;

use chat_server::rates::{PrivatBankClient, RateAggregator};
use chat_server::reply;
use clap::Parser;
use log::{info, warn};

use crate::args::Args;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let args = Args::parse();
    info!(
        "Looking up {} day(s) of rates for {} via {}",
        args.days(),
        args.currencies.join(","),
        args.api_url
    );

    let source = Arc::new(PrivatBankClient::new(&args.api_url, args.request_timeout())?);
    let aggregator = RateAggregator::new(source, args.max_in_flight);
    let result = aggregator.aggregate(&args.currencies, args.days()).await;

    println!("{}", reply::exchange_summary(&result));
    let failed = result.failures();
    if failed > 0 {
        warn!("{} lookup(s) failed", failed);
    }
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();
}
