// Relative Strength Index (RSI) indicator implementation
use super::IndicatorCalculator;
use crate::error::EngineError;
use serde_json::Value;
use shared::models::{PricedSeries, RsiPoint, RsiSeries};

/// Wilder-smoothed average gain and loss carried from one step to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingState {
    pub avg_gain: f64,
    pub avg_loss: f64,
}

impl SmoothingState {
    /// Simple averages of the first `period` deltas.
    pub fn seed(deltas: &[f64]) -> Self {
        let period = deltas.len() as f64;
        // Each term is divided before summing so huge changes cannot overflow.
        let (avg_gain, avg_loss) = deltas.iter().fold((0.0, 0.0), |(g, l), &change| {
            let (gain, loss) = split_change(change);
            (g + gain / period, l + loss / period)
        });
        Self { avg_gain, avg_loss }
    }

    /// One step of Wilder's recurrence. Always uses the previous smoothed
    /// values, never a window of raw deltas.
    pub fn step(&mut self, change: f64, period: usize) {
        let (gain, loss) = split_change(change);
        // (prev * (p - 1) + x) / p, weighted so the sum stays in range
        let weight = (period - 1) as f64 / period as f64;
        let period = period as f64;
        self.avg_gain = self.avg_gain * weight + gain / period;
        self.avg_loss = self.avg_loss * weight + loss / period;
    }

    /// RSI for the current averages.
    ///
    /// `avg_loss == 0` yields exactly 100, including the flat-price case where
    /// `avg_gain` is also 0. Consumers rely on this value, so the common
    /// "undefined when both averages are zero" convention is not applied.
    pub fn rsi(&self) -> f64 {
        if self.avg_loss == 0.0 {
            return 100.0;
        }
        let rs = self.avg_gain / self.avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }
}

// Gain and loss are mutually exclusive per step; losses are positive values.
fn split_change(change: f64) -> (f64, f64) {
    if change > 0.0 {
        (change, 0.0)
    } else {
        (0.0, -change)
    }
}

/// Computes RSI over `series` with Wilder's smoothing seeded by a simple
/// average of the first `period` deltas.
///
/// The result is index-aligned to `series`. The first `period` values are
/// `None`; every later value is defined. A series with `period` or fewer
/// prices yields all `None` and an empty series yields an empty result.
/// Neither is an error. A `period` of zero is rejected, as is a series whose
/// consecutive prices differ by more than `f64::MAX`.
pub fn compute_rsi(series: &PricedSeries, period: usize) -> Result<RsiSeries, EngineError> {
    if period == 0 {
        return Err(EngineError::InvalidPeriod { period });
    }

    let points = series.points();
    let mut values: Vec<Option<f64>> = vec![None; points.len()];

    if points.len() > period {
        let deltas: Vec<f64> = points.windows(2).map(|w| w[1].price - w[0].price).collect();
        // Finite prices far enough apart overflow to an infinite change
        if let Some(pos) = deltas.iter().position(|d| !d.is_finite()) {
            return Err(EngineError::PriceOverflow { index: pos + 1 });
        }

        // deltas[i - 1] is the change into index i
        let mut state = SmoothingState::seed(&deltas[..period]);
        values[period] = Some(state.rsi());

        for i in (period + 1)..points.len() {
            state.step(deltas[i - 1], period);
            values[i] = Some(state.rsi());
        }
    }

    Ok(RsiSeries::new(
        points
            .iter()
            .zip(values)
            .map(|(point, value)| RsiPoint { timestamp: point.timestamp, value })
            .collect(),
    ))
}

pub struct Rsi {
    name: String,
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self, EngineError> {
        if period == 0 {
            return Err(EngineError::InvalidPeriod { period });
        }
        Ok(Self {
            name: format!("RSI({})", period),
            period,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl IndicatorCalculator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, series: &PricedSeries) -> Result<RsiSeries, EngineError> {
        compute_rsi(series, self.period)
    }
}
