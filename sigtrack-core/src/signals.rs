//! Signal generation — from raw per-ticker analyses to damped trading actions.
//!
//! The generator is a pure decision function over one cycle's analyses plus,
//! in realtime mode, the previous cycle's signal map. Two layers of
//! conservatism keep the output stable:
//!
//! 1. A confidence floor: anything below `min_confidence` becomes Hold.
//! 2. Hysteresis against the previous cycle: a direct Buy↔Sell reversal must
//!    clear `high_confidence` or the previous action is kept, and a sharp
//!    confidence drop is treated as uncertainty (Hold), not a reversal.

use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::domain::{Signal, SignalMap, SignalMode, TickerAnalysis, TradeAction};

/// Stateless signal generator. Holds only the engine thresholds.
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    config: EngineConfig,
}

impl SignalGenerator {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Resolve one cycle's analyses into a signal map.
    ///
    /// `previous` is the prior cycle's signal map; damping against it applies
    /// only in realtime mode. Tickers absent from `previous` take their mapped
    /// action unconditionally (subject to the confidence floor).
    pub fn generate(
        &self,
        analyses: &[TickerAnalysis],
        mode: SignalMode,
        previous: Option<&SignalMap>,
    ) -> SignalMap {
        let mut signals = SignalMap::new();
        let timestamp = Utc::now();

        for analysis in analyses {
            // Out-of-range confidence is an upstream bug; clamp rather than crash.
            let confidence = analysis.confidence.clamp(0.0, 1.0);
            let mut action = analysis.classification.to_action();

            if confidence < self.config.min_confidence {
                debug!(
                    "{}: low confidence ({confidence:.2}) -> hold",
                    analysis.ticker
                );
                action = TradeAction::Hold;
            }

            if mode == SignalMode::Realtime {
                if let Some(previous) = previous {
                    action = self.damp(&analysis.ticker, action, confidence, previous);
                }
            }

            signals.insert(
                analysis.ticker.clone(),
                Signal {
                    ticker: analysis.ticker.clone(),
                    action,
                    confidence,
                    sentiment: analysis.sentiment.clone(),
                    reasoning: analysis.reasoning.clone(),
                    key_points: analysis.key_points.clone(),
                    risk_factors: analysis.risk_factors.clone(),
                    expected_impact: analysis.expected_impact.clone(),
                    impact_magnitude: analysis.impact_magnitude.clone(),
                    price: None,
                    mode,
                    timestamp,
                },
            );
        }

        let buys = signals
            .values()
            .filter(|s| s.action == TradeAction::Buy)
            .count();
        let sells = signals
            .values()
            .filter(|s| s.action == TradeAction::Sell)
            .count();
        info!(
            "generated {} signals (buy: {buys}, sell: {sells}, hold: {})",
            signals.len(),
            signals.len() - buys - sells
        );

        signals
    }

    /// Hysteresis against the previous cycle's signal for this ticker.
    fn damp(
        &self,
        ticker: &str,
        new_action: TradeAction,
        new_confidence: f64,
        previous: &SignalMap,
    ) -> TradeAction {
        let Some(prev) = previous.get(ticker) else {
            // First sighting: nothing to damp against.
            return new_action;
        };

        if new_action == prev.action {
            return new_action;
        }

        // A direct long<->short flip needs conviction; otherwise stand pat.
        if new_action.is_reversal_of(prev.action) && new_confidence < self.config.high_confidence {
            info!(
                "{ticker}: {} -> {} reversal below high confidence \
                 ({new_confidence:.2} < {:.2}), keeping {}",
                prev.action, new_action, self.config.high_confidence, prev.action
            );
            return prev.action;
        }

        // A sharp confidence drop reads as uncertainty, not a new view.
        if new_confidence < prev.confidence - self.config.confidence_drop {
            info!(
                "{ticker}: confidence dropped {:.2} -> {new_confidence:.2}, moving to hold",
                prev.confidence
            );
            return TradeAction::Hold;
        }

        new_action
    }
}

/// How one ticker's signal moved between two cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignalDelta {
    /// Ticker not present in the previous cycle.
    New { action: TradeAction },
    ActionChanged {
        previous_action: TradeAction,
        action: TradeAction,
    },
    /// Same action, but confidence moved by more than the drop threshold.
    ConfidenceShift {
        action: TradeAction,
        previous_confidence: f64,
        confidence: f64,
    },
}

/// Diff two cycles' signal maps, keeping only meaningful movement: new
/// tickers, action changes, and confidence shifts larger than
/// `config.confidence_drop`.
pub fn diff_signals(
    current: &SignalMap,
    previous: &SignalMap,
    config: &EngineConfig,
) -> Vec<(String, SignalDelta)> {
    let mut deltas = Vec::new();

    for (ticker, signal) in current {
        let Some(prev) = previous.get(ticker) else {
            deltas.push((
                ticker.clone(),
                SignalDelta::New {
                    action: signal.action,
                },
            ));
            continue;
        };

        if signal.action != prev.action {
            deltas.push((
                ticker.clone(),
                SignalDelta::ActionChanged {
                    previous_action: prev.action,
                    action: signal.action,
                },
            ));
        } else if (signal.confidence - prev.confidence).abs() > config.confidence_drop {
            deltas.push((
                ticker.clone(),
                SignalDelta::ConfidenceShift {
                    action: signal.action,
                    previous_confidence: prev.confidence,
                    confidence: signal.confidence,
                },
            ));
        }
    }

    deltas
}
