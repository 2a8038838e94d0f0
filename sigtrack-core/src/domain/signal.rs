//! Resolved trading signals — one per ticker per cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::action::TradeAction;
use super::Ticker;

/// Which cycle of the trading day produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalMode {
    PreMarket,
    Realtime,
}

/// One cycle's resolved trading signal for a ticker.
///
/// Carries the damped action plus the qualitative fields from the analysis so
/// downstream reporting does not need to re-join against the analysis record.
/// Signals are immutable once written to the cycle log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub ticker: Ticker,
    pub action: TradeAction,
    pub confidence: f64,
    pub sentiment: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub expected_impact: String,
    #[serde(default)]
    pub impact_magnitude: String,
    /// Transaction price at signal time, when the price collaborator supplied
    /// one. Replay falls back to the closing price when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub mode: SignalMode,
    pub timestamp: DateTime<Utc>,
}

/// Per-cycle signal map keyed by ticker.
///
/// BTreeMap keeps persisted cycles and iteration order deterministic.
pub type SignalMap = BTreeMap<Ticker, Signal>;

/// Aggregate counts over one cycle's signal map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalSummary {
    pub total: usize,
    pub buy: usize,
    pub sell: usize,
    pub hold: usize,
    pub buy_tickers: Vec<Ticker>,
    pub sell_tickers: Vec<Ticker>,
    pub high_confidence_buy_tickers: Vec<Ticker>,
    pub high_confidence_sell_tickers: Vec<Ticker>,
}

impl SignalSummary {
    /// Tally a signal map. `high_confidence` is the threshold above which a
    /// directional signal counts as high-conviction.
    pub fn from_signals(signals: &SignalMap, high_confidence: f64) -> Self {
        let mut summary = SignalSummary {
            total: signals.len(),
            ..Default::default()
        };

        for (ticker, signal) in signals {
            match signal.action {
                TradeAction::Buy => {
                    summary.buy += 1;
                    summary.buy_tickers.push(ticker.clone());
                    if signal.confidence >= high_confidence {
                        summary.high_confidence_buy_tickers.push(ticker.clone());
                    }
                }
                TradeAction::Sell => {
                    summary.sell += 1;
                    summary.sell_tickers.push(ticker.clone());
                    if signal.confidence >= high_confidence {
                        summary.high_confidence_sell_tickers.push(ticker.clone());
                    }
                }
                TradeAction::Hold => summary.hold += 1,
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_signal(ticker: &str, action: TradeAction, confidence: f64) -> Signal {
        Signal {
            ticker: ticker.to_string(),
            action,
            confidence,
            sentiment: "neutral".into(),
            reasoning: String::new(),
            key_points: Vec::new(),
            risk_factors: Vec::new(),
            expected_impact: String::new(),
            impact_magnitude: String::new(),
            price: None,
            mode: SignalMode::Realtime,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn summary_counts_and_high_confidence_buckets() {
        let mut signals = SignalMap::new();
        signals.insert("AAPL".into(), sample_signal("AAPL", TradeAction::Buy, 0.9));
        signals.insert("MSFT".into(), sample_signal("MSFT", TradeAction::Buy, 0.72));
        signals.insert("TSLA".into(), sample_signal("TSLA", TradeAction::Sell, 0.85));
        signals.insert("NVDA".into(), sample_signal("NVDA", TradeAction::Hold, 0.4));

        let summary = SignalSummary::from_signals(&signals, 0.8);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.buy, 2);
        assert_eq!(summary.sell, 1);
        assert_eq!(summary.hold, 1);
        assert_eq!(summary.high_confidence_buy_tickers, vec!["AAPL"]);
        assert_eq!(summary.high_confidence_sell_tickers, vec!["TSLA"]);
    }

    #[test]
    fn signal_serialization_roundtrip() {
        let signal = sample_signal("AAPL", TradeAction::Buy, 0.83);
        let json = serde_json::to_string(&signal).unwrap();
        let deser: Signal = serde_json::from_str(&json).unwrap();
        assert_eq!(deser.ticker, "AAPL");
        assert_eq!(deser.action, TradeAction::Buy);
        assert_eq!(deser.confidence, 0.83);
        assert!(deser.price.is_none());
    }
}
