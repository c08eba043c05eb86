// engine/src/services/rsi_service/mod.rs
// RsiService and the handlers for each step of an RSI request.
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::data::market_data::MarketDataStore;
use crate::data::source::MarketDataSource;
use crate::error::EngineError;
use crate::models::{RsiReport, RsiRequest};

pub mod calculate_rsi;
pub mod helpers;
pub mod load_prices;

/// Serves RSI requests. Holds no per-request state; only raw fetches are
/// shared between calls through the store.
pub struct RsiService {
    market_data_store: Arc<RwLock<MarketDataStore>>,
    source: Arc<dyn MarketDataSource>,
}

impl RsiService {
    pub fn new(
        market_data_store: Arc<RwLock<MarketDataStore>>,
        source: Arc<dyn MarketDataSource>,
    ) -> Self {
        RsiService {
            market_data_store,
            source,
        }
    }

    pub async fn calculate(&self, request: RsiRequest) -> Result<RsiReport, EngineError> {
        self.calculate_as_of(request, Utc::now().date_naive()).await
    }

    /// Like `calculate`, with "today" pinned for relative date ranges.
    pub async fn calculate_as_of(
        &self,
        request: RsiRequest,
        today: NaiveDate,
    ) -> Result<RsiReport, EngineError> {
        tracing::info!(
            symbol = %request.symbol,
            timeframe = %request.timeframe,
            period = request.period,
            warmup_days = request.warmup_days,
            range = ?request.range,
            "Received RSI request"
        );

        let resolved = request.resolve(today)?;
        let bars = load_prices::handle_load_prices(
            &resolved,
            self.market_data_store.clone(),
            self.source.as_ref(),
        )
        .await?;
        calculate_rsi::handle_calculate_rsi(&resolved, &bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::source::{CsvDirectorySource, FetchQuery};
    use crate::models::DateRange;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use shared::models::{PriceBar, PriceField, TimeFrame};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct CountingSource {
        bars: Vec<PriceBar>,
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl MarketDataSource for CountingSource {
        async fn fetch(&self, query: &FetchQuery) -> Result<Vec<PriceBar>, EngineError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .bars
                .iter()
                .filter(|b| b.timestamp >= query.from && b.timestamp < query.to)
                .cloned()
                .collect())
        }
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    // 40 daily bars from 2024-01-01, strictly rising
    fn rising_bars() -> Vec<PriceBar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..40)
            .map(|i| PriceBar {
                timestamp: start + Duration::days(i),
                close: Some(100.0 + i as f64),
                adj_close: Some(99.0 + i as f64),
            })
            .collect()
    }

    fn create_test_service(bars: Vec<PriceBar>) -> (RsiService, Arc<CountingSource>) {
        let source = Arc::new(CountingSource { bars, fetches: AtomicUsize::new(0) });
        let store = Arc::new(RwLock::new(MarketDataStore::new()));
        (RsiService::new(store, source.clone()), source)
    }

    fn january_window() -> RsiRequest {
        RsiRequest::new("aapl", DateRange::Between { start: date(1, 20), end: date(1, 31) })
    }

    #[tokio::test]
    async fn test_warmup_rows_are_trimmed() {
        let (service, _) = create_test_service(rising_bars());
        let report = service
            .calculate(january_window().with_warmup_days(19))
            .await
            .unwrap();

        assert_eq!(report.symbol, "AAPL");
        assert_eq!(report.warmup_rows, 19);
        assert_eq!(report.rows.len(), 12);
        assert_eq!(report.rows[0].timestamp, Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap());
        assert_eq!(report.rows[0].price, 118.0);
        assert!(report.rows.iter().all(|r| r.rsi == Some(100.0)));
        assert!(!report.insufficient_history());
    }

    #[tokio::test]
    async fn test_without_warmup_history_is_insufficient() {
        let (service, _) = create_test_service(rising_bars());
        let report = service.calculate(january_window()).await.unwrap();

        assert_eq!(report.warmup_rows, 0);
        assert_eq!(report.rows.len(), 12);
        assert!(report.insufficient_history());
    }

    #[tokio::test]
    async fn test_repeated_request_uses_cached_fetch() {
        let (service, source) = create_test_service(rising_bars());
        let first = service.calculate(january_window().with_warmup_days(19)).await.unwrap();
        let second = service.calculate(january_window().with_warmup_days(19)).await.unwrap();
        // A narrower request inside the cached range needs no fetch either
        let narrower = RsiRequest::new("AAPL", DateRange::Between { start: date(1, 25), end: date(1, 30) })
            .with_warmup_days(10);
        service.calculate(narrower).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_wider_request_refetches() {
        let (service, source) = create_test_service(rising_bars());
        service.calculate(january_window()).await.unwrap();
        service.calculate(january_window().with_warmup_days(19)).await.unwrap();
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_price_field_selection() {
        let (service, _) = create_test_service(rising_bars());
        let adjusted = service.calculate(january_window()).await.unwrap();
        assert_eq!(adjusted.price_field, PriceField::AdjClose);
        assert_eq!(adjusted.rows[0].price, 118.0);

        let raw = service
            .calculate(january_window().with_price_field(PriceField::Close))
            .await
            .unwrap();
        assert_eq!(raw.price_field, PriceField::Close);
        assert_eq!(raw.rows[0].price, 119.0);
    }

    #[tokio::test]
    async fn test_no_data_is_market_data_error() {
        let (service, _) = create_test_service(Vec::new());
        let result = service.calculate(january_window()).await;
        assert!(matches!(result, Err(EngineError::MarketDataError(_))));
    }

    #[tokio::test]
    async fn test_invalid_request_skips_fetch() {
        let (service, source) = create_test_service(rising_bars());
        let request = RsiRequest::new("AAPL", DateRange::Between { start: date(2, 1), end: date(1, 1) });
        let result = service.calculate(request).await;

        assert!(matches!(result, Err(EngineError::InvalidRequest(_))));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_last_days_relative_to_today() {
        let (service, _) = create_test_service(rising_bars());
        let request = RsiRequest::new("AAPL", DateRange::LastDays(5)).with_warmup_days(30);
        let report = service.calculate_as_of(request, date(2, 9)).await.unwrap();

        assert_eq!(report.start, date(2, 4));
        assert_eq!(report.end, date(2, 9));
        assert_eq!(report.rows.len(), 6);
        assert!(report.rows.iter().all(|r| r.rsi.is_some()));
    }

    #[tokio::test]
    async fn test_csv_source_end_to_end_with_fallback() {
        let dir = TempDir::new().unwrap();
        let mut content = String::from("Date,Open,High,Low,Close,Volume\n");
        let prices = [
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            45.61, 46.28, 46.28, 46.00,
        ];
        for (i, price) in prices.iter().enumerate() {
            content.push_str(&format!("2024-03-{:02},0,0,0,{},100\n", i + 1, price));
        }
        // Missing price row is dropped, not interpolated
        content.push_str("2024-03-17,0,0,0,null,100\n");
        fs::write(dir.path().join("XYZ_1d.csv"), content).unwrap();

        let source = Arc::new(CsvDirectorySource::new(dir.path()));
        let service = RsiService::new(Arc::new(RwLock::new(MarketDataStore::new())), source);
        let request = RsiRequest::new("xyz", DateRange::Between { start: date(3, 15), end: date(3, 17) })
            .with_warmup_days(14)
            .with_timeframe(TimeFrame::Day1);
        let report = service.calculate(request).await.unwrap();

        assert_eq!(report.price_field, PriceField::Close);
        assert_eq!(report.warmup_rows, 14);
        assert_eq!(report.rows.len(), 2);
        let first = report.rows[0].rsi.unwrap();
        let second = report.rows[1].rsi.unwrap();
        assert!((first - 70.4641).abs() < 1e-3, "got {}", first);
        assert!((second - 66.2496).abs() < 1e-3, "got {}", second);
    }
}
