//! Per-ticker position records and the change events they produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::action::TradeAction;
use super::Ticker;

/// The live trading state for one ticker, carried across cycles.
///
/// Exactly one record per ticker. Repeated same-action signals update it in
/// place; an action change replaces it (entry fields reset, `signal_count`
/// back to 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub ticker: Ticker,
    pub action: TradeAction,
    pub entry_date: DateTime<Utc>,
    pub entry_confidence: f64,
    pub last_updated: DateTime<Utc>,
    pub current_confidence: f64,
    /// How many consecutive cycles have produced this same action.
    pub signal_count: u32,
    #[serde(default)]
    pub reasoning: String,
}

/// Position map keyed by ticker, as persisted in the snapshot file.
pub type PositionMap = BTreeMap<Ticker, Position>;

/// Kind of transition a position update produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    NewPosition,
    PositionChanged,
    /// A directional position moving to Hold. Produced only by the
    /// actionable-change filter, never by the raw update.
    PositionClosed,
}

/// One cycle's transition event for a ticker whose position changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionChange {
    pub ticker: Ticker,
    pub change_type: ChangeType,
    pub old_action: Option<TradeAction>,
    pub new_action: TradeAction,
    pub old_confidence: Option<f64>,
    pub new_confidence: f64,
    #[serde(default)]
    pub reasoning: String,
    /// Whole days the prior position was held, for change events only.
    pub days_held: Option<i64>,
}

/// Aggregate counts over the position ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionSummary {
    pub total: usize,
    pub buy: usize,
    pub sell: usize,
    pub hold: usize,
    pub buy_tickers: Vec<Ticker>,
    pub sell_tickers: Vec<Ticker>,
    pub hold_tickers: Vec<Ticker>,
}

impl PositionSummary {
    pub fn from_positions(positions: &PositionMap) -> Self {
        let mut summary = PositionSummary {
            total: positions.len(),
            ..Default::default()
        };
        for (ticker, position) in positions {
            match position.action {
                TradeAction::Buy => {
                    summary.buy += 1;
                    summary.buy_tickers.push(ticker.clone());
                }
                TradeAction::Sell => {
                    summary.sell += 1;
                    summary.sell_tickers.push(ticker.clone());
                }
                TradeAction::Hold => {
                    summary.hold += 1;
                    summary.hold_tickers.push(ticker.clone());
                }
            }
        }
        summary
    }
}
