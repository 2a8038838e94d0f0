//! End-to-end: analyses -> damped signals -> ledger updates -> logged cycles
//! -> daily replay.

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone, Utc};
use tempfile::TempDir;

use sigtrack_core::domain::{ChangeType, Classification, SignalMode, TickerAnalysis, TradeAction};
use sigtrack_core::store::{PositionStore, SignalLog};
use sigtrack_core::{run_daily_replay, EngineConfig, PositionTracker, SignalGenerator};

fn analysis(ticker: &str, classification: Classification, confidence: f64) -> TickerAnalysis {
    TickerAnalysis {
        ticker: ticker.to_string(),
        classification,
        sentiment: "positive".into(),
        confidence,
        expected_impact: "bullish".into(),
        impact_magnitude: "medium".into(),
        key_points: vec!["earnings beat".into()],
        risk_factors: vec!["guidance risk".into()],
        reasoning: "strong quarter".into(),
    }
}

#[test]
fn full_day_from_analyses_to_replay_report() {
    let dir = TempDir::new().unwrap();
    let log = SignalLog::new(dir.path().join("signals"));
    let config = EngineConfig::default();
    let generator = SignalGenerator::new(config.clone());
    let mut tracker =
        PositionTracker::open(PositionStore::new(dir.path().join("positions.json")));

    let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
    let at = |h| Utc.from_utc_datetime(&date.and_hms_opt(h, 0, 0).unwrap());

    // Pre-market cycle: two confident calls and one below the floor.
    let morning = generator.generate(
        &[
            analysis("AAPL", Classification::StrongBuy, 0.90),
            analysis("TSLA", Classification::Sell, 0.82),
            analysis("NVDA", Classification::Buy, 0.55),
        ],
        SignalMode::PreMarket,
        None,
    );
    assert_eq!(morning["AAPL"].action, TradeAction::Buy);
    assert_eq!(morning["TSLA"].action, TradeAction::Sell);
    assert_eq!(morning["NVDA"].action, TradeAction::Hold);

    // Attach transaction prices the way the orchestrator would before logging.
    let mut priced = morning.clone();
    priced.get_mut("AAPL").unwrap().price = Some(100.0);
    priced.get_mut("TSLA").unwrap().price = Some(200.0);
    log.append_at(&priced, at(9)).unwrap();

    let changes = tracker.update(&morning).unwrap();
    let actionable = tracker.actionable(&changes);
    assert_eq!(actionable.len(), 2);
    assert_eq!(actionable["AAPL"].change_type, ChangeType::NewPosition);
    assert!(!actionable.contains_key("NVDA"));

    // Realtime cycle: AAPL tries to flip to Sell at 0.75 — damped; NVDA now
    // clears the floor.
    let afternoon = generator.generate(
        &[
            analysis("AAPL", Classification::Sell, 0.75),
            analysis("NVDA", Classification::Buy, 0.85),
        ],
        SignalMode::Realtime,
        Some(&morning),
    );
    assert_eq!(afternoon["AAPL"].action, TradeAction::Buy);
    assert_eq!(afternoon["NVDA"].action, TradeAction::Buy);

    let mut priced = afternoon.clone();
    priced.get_mut("NVDA").unwrap().price = Some(50.0);
    log.append_at(&priced, at(14)).unwrap();

    let changes = tracker.update(&afternoon).unwrap();
    // AAPL stayed Buy: silent refresh, signal_count bumps.
    assert!(!changes.contains_key("AAPL"));
    assert_eq!(tracker.position("AAPL").unwrap().signal_count, 2);
    assert_eq!(changes["NVDA"].change_type, ChangeType::PositionChanged);

    // End of day: replay the logged cycles against closing prices.
    let closing: BTreeMap<String, f64> = [
        ("AAPL".to_string(), 110.0),
        ("TSLA".to_string(), 190.0),
        ("NVDA".to_string(), 55.0),
    ]
    .into_iter()
    .collect();

    let result = run_daily_replay(&log, &closing, date, &config)
        .unwrap()
        .expect("two cycles were logged");

    // AAPL: $900 at $100 -> 9 shares, still open, worth $990 at the close.
    // NVDA: $850 at $50 -> 17 shares, worth $935. TSLA sell was a naked
    // no-op; the NVDA hold in the morning never traded.
    assert_eq!(result.trades.len(), 2);
    assert_eq!(result.closed_trade_count(), 0);
    assert_eq!(result.win_rate, 0.0);
    assert!((result.total_invested - 1_750.0).abs() < 1e-9);
    assert!((result.total_value - 1_925.0).abs() < 1e-9);
    assert!((result.unrealized_pnl - 175.0).abs() < 1e-9);

    // The ledger snapshot survives a restart with identical state.
    let reloaded = PositionTracker::open(PositionStore::new(dir.path().join("positions.json")));
    assert_eq!(reloaded.positions().len(), 3);
    assert_eq!(reloaded.position("AAPL").unwrap().signal_count, 2);
    assert_eq!(reloaded.position("NVDA").unwrap().action, TradeAction::Buy);
}
