// Helper functions shared by the rsi_service handlers
use shared::models::{PriceBar, PriceField, PriceObservation, PricedSeries};

use crate::error::EngineError;

/// The preferred field, unless it is `AdjClose` and the provider supplied no
/// adjusted prices at all, in which case `Close`.
pub fn effective_price_field(bars: &[PriceBar], preferred: PriceField) -> PriceField {
    match preferred {
        PriceField::AdjClose if bars.iter().all(|b| b.adj_close.is_none()) => PriceField::Close,
        field => field,
    }
}

/// Bars with no value for `field` are dropped, not interpolated.
pub fn to_priced_series(bars: &[PriceBar], field: PriceField) -> Result<PricedSeries, EngineError> {
    let observations = bars.iter().map(|b| PriceObservation {
        timestamp: b.timestamp,
        price: b.price(field),
    });
    Ok(PricedSeries::from_observations(observations)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bar(day: u32, close: Option<f64>, adj_close: Option<f64>) -> PriceBar {
        PriceBar {
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            close,
            adj_close,
        }
    }

    #[test]
    fn test_adjusted_falls_back_to_close() {
        let bars = vec![bar(1, Some(1.0), None), bar(2, Some(2.0), None)];
        assert_eq!(effective_price_field(&bars, PriceField::AdjClose), PriceField::Close);
    }

    #[test]
    fn test_adjusted_kept_when_present() {
        let bars = vec![bar(1, Some(1.0), None), bar(2, Some(2.0), Some(1.9))];
        assert_eq!(effective_price_field(&bars, PriceField::AdjClose), PriceField::AdjClose);
        assert_eq!(effective_price_field(&bars, PriceField::Close), PriceField::Close);
    }

    #[test]
    fn test_priced_series_skips_missing_field() {
        let bars = vec![bar(1, Some(1.0), Some(0.9)), bar(2, None, Some(1.8)), bar(3, Some(3.0), None)];
        let close = to_priced_series(&bars, PriceField::Close).unwrap();
        assert_eq!(close.prices().collect::<Vec<_>>(), vec![1.0, 3.0]);
        let adjusted = to_priced_series(&bars, PriceField::AdjClose).unwrap();
        assert_eq!(adjusted.prices().collect::<Vec<_>>(), vec![0.9, 1.8]);
    }
}
