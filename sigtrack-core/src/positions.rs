//! Position ledger — one durable record per ticker, updated every cycle.
//!
//! The state machine per ticker has three states (Buy/Sell/Hold) driven by the
//! incoming signal's action:
//! - no record yet -> create one, emit `NewPosition`
//! - same action   -> refresh confidence/timestamps, bump `signal_count`,
//!                    emit nothing
//! - action change -> replace the record (entry fields reset), emit
//!                    `PositionChanged` with old/new details and days held
//!
//! The full map is rewritten to the snapshot store after every update; a
//! write failure fails the cycle rather than silently diverging from disk.

use std::collections::BTreeMap;

use chrono::Utc;
use log::info;

use crate::domain::{
    ChangeType, Position, PositionChange, PositionMap, PositionSummary, SignalMap, Ticker,
    TradeAction,
};
use crate::store::{PositionStore, StoreError};

/// Map of change events produced by one update cycle, keyed by ticker.
pub type ChangeMap = BTreeMap<Ticker, PositionChange>;

/// Stateful ledger of per-ticker positions backed by a snapshot store.
pub struct PositionTracker {
    store: PositionStore,
    positions: PositionMap,
}

impl PositionTracker {
    /// Load the ledger from the snapshot store. A missing or corrupt snapshot
    /// starts the ledger empty; that is logged inside the store, never fatal.
    pub fn open(store: PositionStore) -> Self {
        let positions = store.load();
        Self { store, positions }
    }

    /// Apply one cycle's signals and persist the updated ledger.
    ///
    /// Returns the change events for tickers whose action moved. Same-action
    /// updates refresh the record silently.
    pub fn update(&mut self, signals: &SignalMap) -> Result<ChangeMap, StoreError> {
        let mut changes = ChangeMap::new();
        let now = Utc::now();

        for (ticker, signal) in signals {
            match self.positions.get_mut(ticker) {
                Some(position) if position.action == signal.action => {
                    position.last_updated = now;
                    position.current_confidence = signal.confidence;
                    position.signal_count += 1;
                }
                Some(position) => {
                    let days_held = (now - position.entry_date).num_days();
                    changes.insert(
                        ticker.clone(),
                        PositionChange {
                            ticker: ticker.clone(),
                            change_type: ChangeType::PositionChanged,
                            old_action: Some(position.action),
                            new_action: signal.action,
                            old_confidence: Some(position.current_confidence),
                            new_confidence: signal.confidence,
                            reasoning: signal.reasoning.clone(),
                            days_held: Some(days_held),
                        },
                    );
                    info!(
                        "{ticker}: position changed {} -> {}",
                        position.action, signal.action
                    );

                    position.action = signal.action;
                    position.entry_date = now;
                    position.entry_confidence = signal.confidence;
                    position.last_updated = now;
                    position.current_confidence = signal.confidence;
                    position.signal_count = 1;
                    position.reasoning = signal.reasoning.clone();
                }
                None => {
                    self.positions.insert(
                        ticker.clone(),
                        Position {
                            ticker: ticker.clone(),
                            action: signal.action,
                            entry_date: now,
                            entry_confidence: signal.confidence,
                            last_updated: now,
                            current_confidence: signal.confidence,
                            signal_count: 1,
                            reasoning: signal.reasoning.clone(),
                        },
                    );
                    changes.insert(
                        ticker.clone(),
                        PositionChange {
                            ticker: ticker.clone(),
                            change_type: ChangeType::NewPosition,
                            old_action: None,
                            new_action: signal.action,
                            old_confidence: None,
                            new_confidence: signal.confidence,
                            reasoning: signal.reasoning.clone(),
                            days_held: None,
                        },
                    );
                    info!("{ticker}: new position -> {}", signal.action);
                }
            }
        }

        self.store.save(&self.positions)?;
        info!("updated positions, {} changes detected", changes.len());

        Ok(changes)
    }

    /// Filter change events down to the ones worth announcing.
    ///
    /// Actionable: a brand-new directional position, Hold -> Buy/Sell, a
    /// direct Buy<->Sell reversal, or a directional position moving to Hold
    /// (re-tagged `PositionClosed`). Everything else is dropped.
    pub fn actionable(&self, changes: &ChangeMap) -> ChangeMap {
        let mut actionable = ChangeMap::new();

        for (ticker, change) in changes {
            if let Some(filtered) = evaluate_change(change) {
                actionable.insert(ticker.clone(), filtered);
            }
        }

        info!("filtered to {} actionable changes", actionable.len());
        actionable
    }

    pub fn position(&self, ticker: &str) -> Option<&Position> {
        self.positions.get(ticker)
    }

    pub fn positions(&self) -> &PositionMap {
        &self.positions
    }

    pub fn positions_by_action(&self, action: TradeAction) -> Vec<&Position> {
        self.positions
            .values()
            .filter(|p| p.action == action)
            .collect()
    }

    pub fn summary(&self) -> PositionSummary {
        PositionSummary::from_positions(&self.positions)
    }
}

fn evaluate_change(change: &PositionChange) -> Option<PositionChange> {
    match change.change_type {
        ChangeType::NewPosition => {
            // A brand-new Hold is not worth announcing.
            change.new_action.is_directional().then(|| change.clone())
        }
        ChangeType::PositionChanged => evaluate_transition(change),
        // Raw updates never produce PositionClosed; only this filter does.
        ChangeType::PositionClosed => Some(change.clone()),
    }
}

fn evaluate_transition(change: &PositionChange) -> Option<PositionChange> {
    let old_action = change.old_action?;
    let new_action = change.new_action;

    // Hold -> directional: entering the market.
    if old_action == TradeAction::Hold && new_action.is_directional() {
        return Some(change.clone());
    }

    // Direct reversal.
    if new_action.is_reversal_of(old_action) {
        return Some(change.clone());
    }

    // Directional -> Hold: leaving the market, re-tagged as a close.
    if new_action == TradeAction::Hold && old_action.is_directional() {
        return Some(PositionChange {
            change_type: ChangeType::PositionClosed,
            ..change.clone()
        });
    }

    None
}
