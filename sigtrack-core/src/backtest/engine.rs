//! Replay engine — simulates one day of signals against observed prices.
//!
//! Sizing is confidence-weighted and capital-unconstrained:
//! `investment = base_investment * confidence`, fractional shares allowed.
//! At most one open lot per ticker; a Buy while holding and a Sell while flat
//! are both logged no-ops. Each Sell closes exactly the lot that was open for
//! its ticker, so realized-trade pairing stays exact through repeated
//! buy/sell cycles on the same ticker.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::config::EngineConfig;
use crate::domain::{
    BacktestResult, ClosedTrade, OpenLot, PositionAtClose, Ticker, Trade, TradeAction,
};

/// One replay run's mutable state.
pub struct Backtester {
    config: EngineConfig,
    lots: BTreeMap<Ticker, OpenLot>,
    trades: Vec<Trade>,
    closed: Vec<ClosedTrade>,
    total_invested: f64,
    total_proceeds: f64,
}

impl Backtester {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            lots: BTreeMap::new(),
            trades: Vec::new(),
            closed: Vec::new(),
            total_invested: 0.0,
            total_proceeds: 0.0,
        }
    }

    /// Apply one signal. Returns the simulated fill, if the signal traded.
    pub fn process_signal(
        &mut self,
        ticker: &str,
        action: TradeAction,
        price: f64,
        confidence: f64,
        timestamp: DateTime<Utc>,
        reasoning: &str,
    ) -> Option<Trade> {
        match action {
            TradeAction::Hold => None,
            TradeAction::Buy => self.buy(ticker, price, confidence, timestamp, reasoning),
            TradeAction::Sell => self.sell(ticker, price, confidence, timestamp, reasoning),
        }
    }

    fn buy(
        &mut self,
        ticker: &str,
        price: f64,
        confidence: f64,
        timestamp: DateTime<Utc>,
        reasoning: &str,
    ) -> Option<Trade> {
        // Single lot per ticker: no averaging into an existing holding.
        if self.lots.contains_key(ticker) {
            debug!("{ticker}: already holding, skipping repeat buy");
            return None;
        }
        if price <= 0.0 {
            warn!("{ticker}: non-positive price {price}, skipping buy");
            return None;
        }

        let confidence = confidence.clamp(0.0, 1.0);
        let investment = self.config.base_investment * confidence;
        if investment <= 0.0 {
            debug!("{ticker}: zero-confidence buy sizes to nothing, skipping");
            return None;
        }
        let shares = investment / price;
        let cost = investment * (1.0 + self.config.commission);

        self.total_invested += cost;
        self.lots.insert(
            ticker.to_string(),
            OpenLot {
                ticker: ticker.to_string(),
                shares,
                entry_price: price,
                investment: cost,
                entry_time: timestamp,
                entry_confidence: confidence,
            },
        );

        let trade = Trade {
            ticker: ticker.to_string(),
            action: TradeAction::Buy,
            price,
            shares,
            timestamp,
            confidence,
            reasoning: reasoning.to_string(),
            investment_amount: cost,
        };
        self.trades.push(trade.clone());

        info!("buy {ticker}: {shares:.4} shares @ ${price:.2} (${cost:.2})");
        Some(trade)
    }

    fn sell(
        &mut self,
        ticker: &str,
        price: f64,
        confidence: f64,
        timestamp: DateTime<Utc>,
        reasoning: &str,
    ) -> Option<Trade> {
        let Some(lot) = self.lots.remove(ticker) else {
            debug!("{ticker}: nothing held, skipping sell");
            return None;
        };

        let proceeds = lot.shares * price * (1.0 - self.config.commission);
        self.total_proceeds += proceeds;

        let pnl = proceeds - lot.investment;
        let pnl_pct = if lot.investment > 0.0 {
            pnl / lot.investment * 100.0
        } else {
            0.0
        };
        self.closed.push(ClosedTrade {
            ticker: ticker.to_string(),
            buy_price: lot.entry_price,
            sell_price: price,
            shares: lot.shares,
            pnl,
            pnl_pct,
        });

        let trade = Trade {
            ticker: ticker.to_string(),
            action: TradeAction::Sell,
            price,
            shares: lot.shares,
            timestamp,
            confidence,
            reasoning: reasoning.to_string(),
            investment_amount: proceeds,
        };
        self.trades.push(trade.clone());

        info!(
            "sell {ticker}: {:.4} shares @ ${price:.2} (pnl {pnl:+.2} / {pnl_pct:+.2}%)",
            lot.shares
        );
        Some(trade)
    }

    /// Number of lots still open.
    pub fn open_lot_count(&self) -> usize {
        self.lots.len()
    }

    /// Close out the run: mark open lots against closing prices and compute
    /// the day's statistics.
    ///
    /// A still-open lot without a closing price is excluded from the
    /// valuation with a warning.
    pub fn finalize(self, closing_prices: &BTreeMap<Ticker, f64>) -> BacktestResult {
        let mut positions_at_close = BTreeMap::new();
        let mut unrealized_pnl = 0.0;
        let mut open_market_value = 0.0;

        for (ticker, lot) in &self.lots {
            let Some(&closing_price) = closing_prices.get(ticker) else {
                warn!("{ticker}: no closing price, excluding open lot from valuation");
                continue;
            };

            let market_value = lot.shares * closing_price;
            let pnl = market_value - lot.investment;
            let pnl_pct = if lot.investment > 0.0 {
                pnl / lot.investment * 100.0
            } else {
                0.0
            };

            unrealized_pnl += pnl;
            open_market_value += market_value;
            positions_at_close.insert(
                ticker.clone(),
                PositionAtClose {
                    shares: lot.shares,
                    entry_price: lot.entry_price,
                    closing_price,
                    investment: lot.investment,
                    market_value,
                    pnl,
                    pnl_pct,
                },
            );
        }

        let winning_trades = self.closed.iter().filter(|t| t.is_winner()).count();
        let losing_trades = self.closed.len() - winning_trades;
        let win_rate = if self.closed.is_empty() {
            0.0
        } else {
            winning_trades as f64 / self.closed.len() as f64 * 100.0
        };

        let best_trade = self
            .closed
            .iter()
            .max_by(|a, b| a.pnl.total_cmp(&b.pnl))
            .cloned();
        let worst_trade = self
            .closed
            .iter()
            .min_by(|a, b| a.pnl.total_cmp(&b.pnl))
            .cloned();

        let total_value = self.total_proceeds + open_market_value;
        let total_return_usd = total_value - self.total_invested;
        let total_return_pct = if self.total_invested > 0.0 {
            total_return_usd / self.total_invested * 100.0
        } else {
            0.0
        };

        info!(
            "replay finished: invested ${:.2}, value ${total_value:.2} ({total_return_pct:+.2}%)",
            self.total_invested
        );

        BacktestResult {
            total_invested: self.total_invested,
            total_proceeds: self.total_proceeds,
            total_value,
            total_return_pct,
            total_return_usd,
            trades: self.trades,
            winning_trades,
            losing_trades,
            win_rate,
            best_trade,
            worst_trade,
            positions_at_close,
            unrealized_pnl,
        }
    }
}
