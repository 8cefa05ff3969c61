//! Concurrent rate aggregation.
//!
//! A command asks for `days` days of rates for several currencies. Every
//! `(currency, day offset)` pair is an independent lookup; the aggregator issues them
//! concurrently and then reassembles the answers by slot so the result is ordered by
//! currency (command order) and by date (today first) no matter which lookup finished
//! first.
//!
//! The number of lookups in flight is bounded twice: per command by
//! `buffer_unordered`, and across all sessions by a shared semaphore, so a burst of
//! commands from many clients still presents at most `max_in_flight` concurrent
//! requests to the upstream API.

use std::collections::HashMap;
use std::sync::Arc;

use chat_common::command::MAX_DAYS;
use chrono::{Local, NaiveDate, TimeDelta};
use futures_util::stream::{self, StreamExt};
use log::{debug, warn};
use tokio::sync::Semaphore;

use super::{LookupError, RateSource, format_date};

/// Default bound for concurrent upstream lookups.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 10;

/// Rate (or failure) for one day.
#[derive(Debug)]
pub struct DatedRate {
    pub date: NaiveDate,
    pub rate: Result<String, LookupError>,
}

/// All requested days for one currency, most recent first.
#[derive(Debug)]
pub struct CurrencyRates {
    pub currency: String,
    pub rates: Vec<DatedRate>,
}

/// Answer to one `exchange` command.
#[derive(Debug)]
pub struct RateResult {
    /// Number of days covered, after capping.
    pub days: u32,
    /// One entry per requested currency, in command order.
    pub currencies: Vec<CurrencyRates>,
}

impl RateResult {
    /// Number of pairs whose lookup failed.
    pub fn failures(&self) -> usize {
        self.currencies
            .iter()
            .flat_map(|c| &c.rates)
            .filter(|r| r.rate.is_err())
            .count()
    }
}

/// Position of a lookup in the final result.
type Slot = (usize, u32);

struct RateRequest {
    slot: Slot,
    currency: String,
    date: NaiveDate,
}

/// Fans lookups out to a [`RateSource`] with bounded concurrency.
#[derive(Clone)]
pub struct RateAggregator {
    source: Arc<dyn RateSource>,
    permits: Arc<Semaphore>,
    max_in_flight: usize,
}

impl RateAggregator {
    pub fn new(source: Arc<dyn RateSource>, max_in_flight: usize) -> Self {
        let max_in_flight = max_in_flight.max(1);
        Self {
            source,
            permits: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
        }
    }

    /// Aggregate rates counting back from the local calendar date.
    pub async fn aggregate(&self, currencies: &[String], days: u32) -> RateResult {
        self.aggregate_from(Local::now().date_naive(), currencies, days)
            .await
    }

    /// Aggregate rates for `today - offset`, `offset` in `0..days`.
    pub async fn aggregate_from(
        &self,
        today: NaiveDate,
        currencies: &[String],
        days: u32,
    ) -> RateResult {
        let days = days.clamp(1, MAX_DAYS);
        let requests: Vec<RateRequest> = currencies
            .iter()
            .enumerate()
            .flat_map(|(index, currency)| {
                (0..days).map(move |offset| RateRequest {
                    slot: (index, offset),
                    currency: currency.clone(),
                    date: today - TimeDelta::days(i64::from(offset)),
                })
            })
            .collect();
        debug!(
            "Aggregating {} lookup(s) via {} for {} currencies over {} day(s)",
            requests.len(),
            self.source.name(),
            currencies.len(),
            days
        );

        let mut outcomes: HashMap<Slot, Result<String, LookupError>> = stream::iter(requests)
            .map(|request| self.lookup(request))
            .buffer_unordered(self.max_in_flight)
            .collect()
            .await;

        let currencies = currencies
            .iter()
            .enumerate()
            .map(|(index, currency)| CurrencyRates {
                currency: currency.clone(),
                rates: (0..days)
                    .map(|offset| {
                        let date = today - TimeDelta::days(i64::from(offset));
                        let rate = outcomes.remove(&(index, offset)).unwrap_or_else(|| {
                            Err(LookupError::NotFound {
                                currency: currency.clone(),
                                date: format_date(date),
                            })
                        });
                        DatedRate { date, rate }
                    })
                    .collect(),
            })
            .collect();

        RateResult { days, currencies }
    }

    async fn lookup(&self, request: RateRequest) -> (Slot, Result<String, LookupError>) {
        // The semaphore is never closed, so acquisition only waits.
        let _permit = self.permits.acquire().await.ok();
        let rate = self.source.fetch_rate(&request.currency, request.date).await;
        if let Err(e) = &rate {
            warn!(
                "Error fetching exchange rate for {} on {}: {}",
                request.currency,
                format_date(request.date),
                e
            );
        }
        (request.slot, rate)
    }
}
