//! Log-driven daily replay: feed one date's persisted cycles through the
//! engine in cycle order.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::{info, warn};

use super::engine::Backtester;
use crate::config::EngineConfig;
use crate::domain::{BacktestResult, Ticker};
use crate::store::{SignalLog, StoreError};

/// Replay every cycle logged on `date` against `closing_prices`.
///
/// Returns `None` when the date has no log entries. Within a cycle, a
/// signal's transaction price is its embedded price when present, the
/// closing price otherwise; with neither, the signal is skipped.
pub fn run_daily_replay(
    log: &SignalLog,
    closing_prices: &BTreeMap<Ticker, f64>,
    date: NaiveDate,
    config: &EngineConfig,
) -> Result<Option<BacktestResult>, StoreError> {
    let entries = log.entries_for_date(date)?;
    if entries.is_empty() {
        warn!("no signal log entries for {date}");
        return Ok(None);
    }
    info!("replaying {} signal cycles for {date}", entries.len());

    let mut backtester = Backtester::new(config.clone());

    for entry in entries {
        for (ticker, signal) in &entry.signals {
            let Some(price) = signal.price.or_else(|| closing_prices.get(ticker).copied())
            else {
                warn!("{ticker}: no price available, skipping signal");
                continue;
            };

            backtester.process_signal(
                ticker,
                signal.action,
                price,
                signal.confidence,
                entry.generated_at,
                &signal.reasoning,
            );
        }
    }

    Ok(Some(backtester.finalize(closing_prices)))
}
