//! sigtrack core — signal engine, position ledger, and daily replay.
//!
//! Three tightly coupled pieces:
//! - [`signals::SignalGenerator`] damps noisy per-cycle LLM classifications
//!   into stable trading actions (confidence floor + reversal hysteresis)
//! - [`positions::PositionTracker`] keeps the durable per-ticker ledger and
//!   classifies each update as notification-worthy or silent
//! - [`backtest`] replays a day's persisted signal cycles against closing
//!   prices into a simulated P&L report
//!
//! Everything else — news/price retrieval, the LLM call, chat delivery, the
//! scheduler — lives outside this crate and talks to it through the typed
//! records in [`domain`] and the file formats in [`store`].

pub mod backtest;
pub mod config;
pub mod domain;
pub mod positions;
pub mod signals;
pub mod store;

pub use backtest::{run_daily_replay, Backtester};
pub use config::EngineConfig;
pub use positions::PositionTracker;
pub use signals::SignalGenerator;
