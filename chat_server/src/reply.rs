//! Text replies sent back to the issuer of an `exchange` command.

use chat_common::command::USAGE;

use crate::rates::{RateResult, format_date};

/// Currency every rate is quoted against.
pub const REFERENCE_CURRENCY: &str = "UAH";

/// Reply for an `exchange` line whose arguments do not parse.
pub fn format_error() -> String {
    format!("Error: command format should be '{USAGE}'")
}

/// Render an aggregated result, one line per currency header and per day.
pub fn exchange_summary(result: &RateResult) -> String {
    let mut lines = vec![format!("Exchange rates for the last {} days:", result.days)];
    for entry in &result.currencies {
        let currency = &entry.currency;
        lines.push(format!("Exchange rates for {currency}:"));
        for dated in &entry.rates {
            let date = format_date(dated.date);
            lines.push(match &dated.rate {
                Ok(rate) => format!("On {date}, 1 {currency} = {rate} {REFERENCE_CURRENCY}"),
                Err(e) => format!("On {date}, failed to fetch 1 {currency} rate: {e}"),
            });
        }
    }
    lines.join("\n")
}
