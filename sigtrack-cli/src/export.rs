//! Trade tape export (CSV).

use anyhow::{Context, Result};
use std::path::Path;

use sigtrack_core::domain::Trade;

/// Write the replay's trade tape as CSV.
///
/// Columns: ticker, action, price, shares, timestamp, confidence, amount,
/// reasoning.
pub fn write_trades_csv(path: &Path, trades: &[Trade]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create trades CSV {}", path.display()))?;

    wtr.write_record([
        "ticker",
        "action",
        "price",
        "shares",
        "timestamp",
        "confidence",
        "amount",
        "reasoning",
    ])?;

    for trade in trades {
        wtr.write_record([
            trade.ticker.clone(),
            trade.action.to_string(),
            format!("{:.4}", trade.price),
            format!("{:.4}", trade.shares),
            trade.timestamp.to_rfc3339(),
            format!("{:.2}", trade.confidence),
            format!("{:.2}", trade.investment_amount),
            trade.reasoning.clone(),
        ])?;
    }

    wtr.flush()
        .with_context(|| format!("failed to write trades CSV {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sigtrack_core::domain::TradeAction;
    use tempfile::TempDir;

    #[test]
    fn writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");

        let trades = vec![Trade {
            ticker: "AAPL".into(),
            action: TradeAction::Buy,
            price: 100.0,
            shares: 10.0,
            timestamp: Utc::now(),
            confidence: 1.0,
            reasoning: "strong quarter".into(),
            investment_amount: 1000.0,
        }];

        write_trades_csv(&path, &trades).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("ticker,action,price"));
        assert!(lines.next().unwrap().starts_with("AAPL,buy,100.0000,10.0000"));
    }
}
