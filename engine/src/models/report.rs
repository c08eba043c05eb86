use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use shared::models::{PriceField, TimeFrame};

/// One visible row: the unrounded price and its RSI, if defined yet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RsiRow {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub rsi: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RsiReport {
    pub symbol: String,
    pub timeframe: TimeFrame,
    pub period: usize,
    /// The column actually used, after any adjusted-close fallback.
    pub price_field: PriceField,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub rows: Vec<RsiRow>,
    /// Priced rows consumed before the visible window.
    pub warmup_rows: usize,
}

impl RsiReport {
    /// No RSI value is defined anywhere in the visible window.
    pub fn insufficient_history(&self) -> bool {
        self.rows.iter().all(|row| row.rsi.is_none())
    }

    pub fn tail(&self, n: usize) -> &[RsiRow] {
        let skip = self.rows.len().saturating_sub(n);
        &self.rows[skip..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn report(rsi: Vec<Option<f64>>) -> RsiReport {
        let rows = rsi
            .into_iter()
            .enumerate()
            .map(|(i, rsi)| RsiRow {
                timestamp: Utc.with_ymd_and_hms(2024, 1, i as u32 + 1, 0, 0, 0).unwrap(),
                price: 10.0 + i as f64,
                rsi,
            })
            .collect();
        RsiReport {
            symbol: "AAPL".to_string(),
            timeframe: TimeFrame::Day1,
            period: 14,
            price_field: PriceField::Close,
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            rows,
            warmup_rows: 0,
        }
    }

    #[test]
    fn test_insufficient_history() {
        assert!(report(vec![None, None]).insufficient_history());
        assert!(report(vec![]).insufficient_history());
        assert!(!report(vec![None, Some(40.0)]).insufficient_history());
    }

    #[test]
    fn test_tail() {
        let r = report(vec![None, Some(1.0), Some(2.0)]);
        assert_eq!(r.tail(2).len(), 2);
        assert_eq!(r.tail(2)[0].rsi, Some(1.0));
        assert_eq!(r.tail(10).len(), 3);
    }
}
