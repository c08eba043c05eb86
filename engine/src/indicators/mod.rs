// Technical indicators module
pub mod rsi;

pub use rsi::{compute_rsi, Rsi, SmoothingState};

use crate::error::EngineError;
use serde_json::Value;
use shared::models::{PricedSeries, RsiSeries};

// Common trait for indicators computed over a priced series
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &str;
    fn parameters(&self) -> Value; // Parameters used for this indicator instance
    fn calculate(&self, series: &PricedSeries) -> Result<RsiSeries, EngineError>;
}
