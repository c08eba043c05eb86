use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Series timestamps must be strictly increasing (violated at index {index})")]
    UnorderedSeries { index: usize },

    #[error("Unknown interval '{0}'. Use '1d' or '1h'.")]
    UnknownTimeFrame(String),

    #[error("Unknown price field '{0}'. Use 'close' or 'adj_close'.")]
    UnknownPriceField(String),
}

/// One provider row after schema normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
}

impl PriceBar {
    pub fn price(&self, field: PriceField) -> Option<f64> {
        match field {
            PriceField::Close => self.close,
            PriceField::AdjClose => self.adj_close,
        }
    }
}

/// A timestamped price that may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub timestamp: DateTime<Utc>,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// Chronologically ordered prices with unique timestamps and no gaps in the
/// values themselves. Missing observations are dropped on construction, so
/// positions count available prices rather than calendar bars.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PricedSeries {
    points: Vec<PricePoint>,
}

impl PricedSeries {
    /// Drops observations without a finite price, then checks ordering.
    pub fn from_observations<I>(observations: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = PriceObservation>,
    {
        let points = observations
            .into_iter()
            .filter_map(|obs| {
                obs.price
                    .filter(|p| p.is_finite())
                    .map(|price| PricePoint { timestamp: obs.timestamp, price })
            })
            .collect();
        Self::from_points(points)
    }

    pub fn from_points(points: Vec<PricePoint>) -> Result<Self, ModelError> {
        if let Some(index) = points
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(ModelError::UnorderedSeries { index: index + 1 });
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiPoint {
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

/// RSI values index-aligned to the `PricedSeries` they were computed from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RsiSeries {
    points: Vec<RsiPoint>,
}

impl RsiSeries {
    pub fn new(points: Vec<RsiPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[RsiPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn first_defined_index(&self) -> Option<usize> {
        self.points.iter().position(|p| p.value.is_some())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeFrame {
    Hour1,
    Day1,
}

impl TimeFrame {
    /// Interval code as used by market-data providers.
    pub fn code(&self) -> &'static str {
        match self {
            TimeFrame::Hour1 => "1h",
            TimeFrame::Day1 => "1d",
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TimeFrame {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" | "d" | "day" | "daily" => Ok(TimeFrame::Day1),
            "1h" | "h" | "hour" | "hourly" | "60m" => Ok(TimeFrame::Hour1),
            _ => Err(ModelError::UnknownTimeFrame(s.to_string())),
        }
    }
}

/// Which provider column feeds the indicator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PriceField {
    Close,
    AdjClose,
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceField::Close => f.write_str("Close"),
            PriceField::AdjClose => f.write_str("Adj Close"),
        }
    }
}

impl FromStr for PriceField {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "close" => Ok(PriceField::Close),
            "adj_close" | "adjclose" | "adjusted" => Ok(PriceField::AdjClose),
            _ => Err(ModelError::UnknownPriceField(s.to_string())),
        }
    }
}
