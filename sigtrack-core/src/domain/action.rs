//! Trading actions and the raw LLM classification they are derived from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resolved trading action for one ticker.
///
/// This is the closed three-state vocabulary the rest of the system speaks:
/// the signal generator emits it, the position ledger stores it, the replay
/// engine consumes it. Serialized as snake_case strings so persisted records
/// stay human-diffable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl TradeAction {
    /// True for Buy/Sell, false for Hold.
    pub fn is_directional(self) -> bool {
        matches!(self, TradeAction::Buy | TradeAction::Sell)
    }

    /// True when `self` and `other` are opposing directional actions.
    pub fn is_reversal_of(self, other: TradeAction) -> bool {
        matches!(
            (self, other),
            (TradeAction::Buy, TradeAction::Sell) | (TradeAction::Sell, TradeAction::Buy)
        )
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TradeAction::Buy => "buy",
            TradeAction::Sell => "sell",
            TradeAction::Hold => "hold",
        };
        f.write_str(s)
    }
}

/// Five-grade recommendation as emitted by the analysis collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Classification {
    /// Collapse the five-grade classification into the three-state action
    /// vocabulary: strong_buy/buy → Buy, hold → Hold, sell/strong_sell → Sell.
    pub fn to_action(self) -> TradeAction {
        match self {
            Classification::StrongBuy | Classification::Buy => TradeAction::Buy,
            Classification::Hold => TradeAction::Hold,
            Classification::Sell | Classification::StrongSell => TradeAction::Sell,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_collapses_to_three_actions() {
        assert_eq!(Classification::StrongBuy.to_action(), TradeAction::Buy);
        assert_eq!(Classification::Buy.to_action(), TradeAction::Buy);
        assert_eq!(Classification::Hold.to_action(), TradeAction::Hold);
        assert_eq!(Classification::Sell.to_action(), TradeAction::Sell);
        assert_eq!(Classification::StrongSell.to_action(), TradeAction::Sell);
    }

    #[test]
    fn reversal_detection() {
        assert!(TradeAction::Buy.is_reversal_of(TradeAction::Sell));
        assert!(TradeAction::Sell.is_reversal_of(TradeAction::Buy));
        assert!(!TradeAction::Buy.is_reversal_of(TradeAction::Buy));
        assert!(!TradeAction::Hold.is_reversal_of(TradeAction::Buy));
        assert!(!TradeAction::Buy.is_reversal_of(TradeAction::Hold));
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(serde_json::to_string(&TradeAction::Buy).unwrap(), "\"buy\"");
        assert_eq!(
            serde_json::to_string(&Classification::StrongSell).unwrap(),
            "\"strong_sell\""
        );
        let action: TradeAction = serde_json::from_str("\"hold\"").unwrap();
        assert_eq!(action, TradeAction::Hold);
    }
}
