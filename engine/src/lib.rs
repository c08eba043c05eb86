// Engine library root
// RSI computation over provider price exports, plus the service, data
// adapters and export used by the `rsi-export` binary.

pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod models;
pub mod services;

pub use error::EngineError;
pub use indicators::compute_rsi;
