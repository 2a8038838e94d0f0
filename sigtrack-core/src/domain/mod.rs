//! Domain types for sigtrack

pub mod action;
pub mod analysis;
pub mod backtest;
pub mod position;
pub mod signal;

pub use action::{Classification, TradeAction};
pub use analysis::{AnalysisResult, TickerAnalysis};
pub use backtest::{BacktestResult, ClosedTrade, OpenLot, PositionAtClose, Trade};
pub use position::{ChangeType, Position, PositionChange, PositionMap, PositionSummary};
pub use signal::{Signal, SignalMap, SignalMode, SignalSummary};

/// Ticker symbol type alias
pub type Ticker = String;
