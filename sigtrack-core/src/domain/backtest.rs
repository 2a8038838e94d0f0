//! Replay engine records: trades, lots, and the daily result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::action::TradeAction;
use super::Ticker;

/// A simulated fill produced by the replay engine.
///
/// Fractional shares are allowed: sizing is dollar-first
/// (`shares = investment / price`), not lot-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub ticker: Ticker,
    pub action: TradeAction,
    pub price: f64,
    pub shares: f64,
    pub timestamp: DateTime<Utc>,
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
    /// Dollars committed (buy, commission included) or received
    /// (sell, commission deducted).
    pub investment_amount: f64,
}

/// An open single-lot holding inside one replay run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenLot {
    pub ticker: Ticker,
    pub shares: f64,
    pub entry_price: f64,
    /// Total cost of the lot, commission included.
    pub investment: f64,
    pub entry_time: DateTime<Utc>,
    pub entry_confidence: f64,
}

/// A matched buy/sell pair, recorded at sell time.
///
/// The sell always closes the one lot that was open for the ticker, so the
/// pairing stays exact even through buy-sell-buy sequences within one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub ticker: Ticker,
    pub buy_price: f64,
    pub sell_price: f64,
    pub shares: f64,
    /// Realized P&L: sell proceeds minus the lot's recorded investment.
    pub pnl: f64,
    pub pnl_pct: f64,
}

impl ClosedTrade {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}

/// Valuation of a still-open lot against the closing price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionAtClose {
    pub shares: f64,
    pub entry_price: f64,
    pub closing_price: f64,
    pub investment: f64,
    pub market_value: f64,
    pub pnl: f64,
    pub pnl_pct: f64,
}

/// Result of one daily replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Total dollars committed across all buys (commission included).
    pub total_invested: f64,
    /// Total dollars received across all sells (commission deducted).
    pub total_proceeds: f64,
    /// Proceeds plus the market value of lots still open at the close.
    pub total_value: f64,
    pub total_return_pct: f64,
    pub total_return_usd: f64,
    pub trades: Vec<Trade>,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Percent of closed trades that won; 0 when nothing closed.
    pub win_rate: f64,
    pub best_trade: Option<ClosedTrade>,
    pub worst_trade: Option<ClosedTrade>,
    pub positions_at_close: BTreeMap<Ticker, PositionAtClose>,
    pub unrealized_pnl: f64,
}

impl BacktestResult {
    pub fn closed_trade_count(&self) -> usize {
        self.winning_trades + self.losing_trades
    }
}
