//! Per-ticker analysis records from the LLM collaborator.
//!
//! These are inputs, not owned state: the analysis collaborator produces one
//! `AnalysisResult` per cycle and the signal generator consumes it. Parsing is
//! deliberately lenient — one malformed ticker record must never sink the
//! whole batch (the rest of the cycle still produces signals).

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use super::action::Classification;

/// Analysis of a single ticker for one cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerAnalysis {
    pub ticker: String,
    /// Five-grade recommendation from the model.
    #[serde(alias = "signal")]
    pub classification: Classification,
    pub sentiment: String,
    /// Model confidence in [0, 1]. Clamped defensively downstream, not here.
    pub confidence: f64,
    #[serde(default)]
    pub expected_impact: String,
    #[serde(default)]
    pub impact_magnitude: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
}

/// One cycle's complete analysis output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub analysis_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub market_sentiment: String,
    #[serde(default)]
    pub market_summary: String,
    pub ticker_analyses: Vec<TickerAnalysis>,
}

impl AnalysisResult {
    /// Parse an analysis payload, skipping malformed ticker records.
    ///
    /// Each element of `ticker_analyses` is deserialized independently; a
    /// record missing a required field is dropped with a warning and the rest
    /// of the batch survives. Partial success, never a hard failure for one
    /// bad record.
    pub fn parse_lenient(raw: &serde_json::Value) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        struct RawResult {
            #[serde(default)]
            analysis_id: String,
            timestamp: DateTime<Utc>,
            #[serde(default)]
            market_sentiment: String,
            #[serde(default)]
            market_summary: String,
            #[serde(default)]
            ticker_analyses: Vec<serde_json::Value>,
        }

        let partial: RawResult = RawResult::deserialize(raw)?;
        let ticker_analyses = parse_ticker_analyses(partial.ticker_analyses);

        Ok(AnalysisResult {
            analysis_id: partial.analysis_id,
            timestamp: partial.timestamp,
            market_sentiment: partial.market_sentiment,
            market_summary: partial.market_summary,
            ticker_analyses,
        })
    }
}

/// Deserialize each ticker record independently, dropping the broken ones.
pub fn parse_ticker_analyses(raw: Vec<serde_json::Value>) -> Vec<TickerAnalysis> {
    raw.into_iter()
        .filter_map(|value| match TickerAnalysis::deserialize(&value) {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                let ticker = value
                    .get("ticker")
                    .and_then(|t| t.as_str())
                    .unwrap_or("<unknown>");
                warn!("skipping malformed analysis record for {ticker}: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lenient_parse_keeps_good_records() {
        let raw = json!({
            "analysis_id": "a-1",
            "timestamp": "2025-06-02T13:30:00Z",
            "ticker_analyses": [
                {
                    "ticker": "AAPL",
                    "classification": "buy",
                    "sentiment": "positive",
                    "confidence": 0.82,
                    "reasoning": "supply chain news"
                },
                // Missing classification and confidence: must be skipped.
                { "ticker": "NVDA", "sentiment": "positive" },
                {
                    "ticker": "TSLA",
                    "classification": "strong_sell",
                    "sentiment": "negative",
                    "confidence": 0.91
                }
            ]
        });

        let result = AnalysisResult::parse_lenient(&raw).unwrap();
        let tickers: Vec<&str> = result
            .ticker_analyses
            .iter()
            .map(|a| a.ticker.as_str())
            .collect();
        assert_eq!(tickers, vec!["AAPL", "TSLA"]);
    }

    #[test]
    fn legacy_signal_field_name_is_accepted() {
        let raw = json!({
            "ticker": "MSFT",
            "signal": "strong_buy",
            "sentiment": "positive",
            "confidence": 0.75
        });
        let analysis = TickerAnalysis::deserialize(&raw).unwrap();
        assert_eq!(analysis.classification, Classification::StrongBuy);
    }

    #[test]
    fn all_records_malformed_yields_empty_batch() {
        let raw = json!({
            "timestamp": "2025-06-02T13:30:00Z",
            "ticker_analyses": [ {"ticker": "X"}, {"bogus": true} ]
        });
        let result = AnalysisResult::parse_lenient(&raw).unwrap();
        assert!(result.ticker_analyses.is_empty());
    }
}
