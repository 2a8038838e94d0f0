//! Daily replay backtesting — engine state machine plus the log-driven runner.

pub mod engine;
pub mod replay;

pub use engine::Backtester;
pub use replay::run_daily_replay;
