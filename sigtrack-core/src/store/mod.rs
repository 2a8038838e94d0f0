//! Durable records — the append-only signal cycle log and the position
//! snapshot. Flat JSON files, human-diffable, write-once (signals) or
//! rewrite-in-full (positions).

pub mod position_store;
pub mod signal_log;

pub use position_store::PositionStore;
pub use signal_log::{SignalLog, SignalLogEntry};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed record in {path}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
