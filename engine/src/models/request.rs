use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::models::{PriceField, TimeFrame};

use crate::error::EngineError;

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// The visible window a user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateRange {
    /// `n` days back from today, through today.
    LastDays(u32),
    /// Inclusive calendar dates.
    Between { start: NaiveDate, end: NaiveDate },
}

impl DateRange {
    pub fn resolve(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), EngineError> {
        match *self {
            DateRange::LastDays(0) => Err(EngineError::InvalidRequest(
                "Number of days back must be at least 1".to_string(),
            )),
            DateRange::LastDays(days) => Ok((today - Duration::days(days as i64), today)),
            DateRange::Between { start, end } if start > end => Err(EngineError::InvalidRequest(
                format!("Start date {} is after end date {}", start, end),
            )),
            DateRange::Between { start, end } => Ok((start, end)),
        }
    }
}

/// Everything one RSI request needs, passed explicitly from the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsiRequest {
    pub symbol: String,
    pub range: DateRange,
    /// Extra calendar days fetched before the visible window so the
    /// recurrence has settled by the time the window starts.
    pub warmup_days: u32,
    pub timeframe: TimeFrame,
    pub period: usize,
    /// Preferred price column. `AdjClose` falls back to `Close` when the
    /// provider has no adjusted prices.
    pub price_field: PriceField,
}

impl RsiRequest {
    pub fn new(symbol: impl Into<String>, range: DateRange) -> Self {
        Self {
            symbol: symbol.into(),
            range,
            warmup_days: 0,
            timeframe: TimeFrame::Day1,
            period: DEFAULT_RSI_PERIOD,
            price_field: PriceField::AdjClose,
        }
    }

    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }

    pub fn with_warmup_days(mut self, warmup_days: u32) -> Self {
        self.warmup_days = warmup_days;
        self
    }

    pub fn with_timeframe(mut self, timeframe: TimeFrame) -> Self {
        self.timeframe = timeframe;
        self
    }

    pub fn with_price_field(mut self, price_field: PriceField) -> Self {
        self.price_field = price_field;
        self
    }

    /// Validates the request and pins its windows relative to `today`.
    pub fn resolve(&self, today: NaiveDate) -> Result<ResolvedRequest, EngineError> {
        let symbol = self.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(EngineError::InvalidRequest("Symbol must not be empty".to_string()));
        }
        if self.period == 0 {
            return Err(EngineError::InvalidPeriod { period: self.period });
        }

        let (start, end) = self.range.resolve(today)?;
        let visible_from = start_of_day(start);
        let visible_to = start_of_day(end) + Duration::days(1);
        let fetch_from = visible_from - Duration::days(self.warmup_days as i64);

        Ok(ResolvedRequest {
            symbol,
            timeframe: self.timeframe,
            period: self.period,
            price_field: self.price_field,
            start,
            end,
            fetch_from,
            visible_from,
            visible_to,
        })
    }
}

/// A validated request with concrete UTC bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub symbol: String,
    pub timeframe: TimeFrame,
    pub period: usize,
    pub price_field: PriceField,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub fetch_from: DateTime<Utc>,
    pub visible_from: DateTime<Utc>,
    /// Exclusive; midnight after `end`.
    pub visible_to: DateTime<Utc>,
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}
