// Market-data sources feeding the RSI service
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::models::{PriceBar, TimeFrame};
use std::path::PathBuf;

use super::csv_parser::PriceCsvParser;
use crate::error::EngineError;

/// Bars for `symbol` with `from <= timestamp < to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchQuery {
    pub symbol: String,
    pub timeframe: TimeFrame,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// An unknown symbol or an unsupported range yields an empty result, not an error.
    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<PriceBar>, EngineError>;
}

/// Reads provider exports laid out as `{root}/{SYMBOL}_{interval}.csv`,
/// e.g. `AAPL_1d.csv`.
pub struct CsvDirectorySource {
    root: PathBuf,
}

impl CsvDirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn file_path(&self, symbol: &str, timeframe: TimeFrame) -> PathBuf {
        self.root.join(format!("{}_{}.csv", symbol, timeframe.code()))
    }
}

#[async_trait]
impl MarketDataSource for CsvDirectorySource {
    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<PriceBar>, EngineError> {
        let path = self.file_path(&query.symbol, query.timeframe);

        let content = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    symbol = %query.symbol,
                    timeframe = %query.timeframe,
                    path = %path.display(),
                    "No data file for symbol"
                );
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let bars: Vec<PriceBar> = PriceCsvParser::parse_reader(content.as_slice())?
            .into_iter()
            .filter(|b| b.timestamp >= query.from && b.timestamp < query.to)
            .collect();

        tracing::debug!(
            symbol = %query.symbol,
            path = %path.display(),
            count = bars.len(),
            "Loaded bars from CSV source"
        );
        Ok(bars)
    }
}
