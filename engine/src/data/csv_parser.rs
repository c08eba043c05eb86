use crate::error::EngineError;
use csv::{ReaderBuilder, StringRecord};
use shared::models::PriceBar;
use std::io::Read;

// Parsing of individual provider cells
pub mod provider_format {
    use anyhow::{anyhow, Result};
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

    const MISSING_MARKERS: [&str; 5] = ["", "null", "nan", "-", "n/a"];

    /// Parses a price cell. Empty and placeholder cells are missing observations.
    pub fn parse_price(s: &str) -> Result<Option<f64>> {
        let trimmed = s.trim();
        if MISSING_MARKERS.iter().any(|m| trimmed.eq_ignore_ascii_case(m)) {
            return Ok(None);
        }
        let value: f64 = trimmed
            .parse()
            .map_err(|e| anyhow!("Failed to parse price '{}': {}", s, e))?;
        if !value.is_finite() {
            return Ok(None);
        }
        Ok(Some(value))
    }

    /// Accepts offset-qualified timestamps, naive timestamps (taken as UTC)
    /// and bare dates (midnight UTC).
    pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
        let trimmed = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(dt.with_timezone(&Utc));
        }
        for format in ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z"] {
            if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
                return Ok(dt.with_timezone(&Utc));
            }
        }
        for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(naive.and_utc());
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(naive.and_utc());
            }
        }
        Err(anyhow!("Failed to parse timestamp '{}'", s))
    }

}

const TIMESTAMP_ALIASES: [&str; 4] = ["datetime", "date", "timestamp", "time"];

/// Positions of the columns the engine needs, resolved once from the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub timestamp: usize,
    pub close: usize,
    pub adj_close: Option<usize>,
}

impl ColumnMap {
    pub fn from_headers(headers: &StringRecord) -> Result<Self, EngineError> {
        let names: Vec<String> = headers.iter().map(normalize_header).collect();

        // Exact alias first, then any header mentioning a date or time.
        let timestamp = TIMESTAMP_ALIASES
            .iter()
            .find_map(|alias| names.iter().position(|n| n == alias))
            .or_else(|| names.iter().position(|n| n.contains("date") || n.contains("time")))
            .ok_or_else(|| {
                EngineError::CsvDataFormatError("No date/time column found in header".to_string())
            })?;

        let close = names.iter().position(|n| n == "close").ok_or_else(|| {
            EngineError::CsvDataFormatError("No 'Close' column found in header".to_string())
        })?;

        let adj_close = names.iter().position(|n| n.replace([' ', '_'], "") == "adjclose");

        Ok(Self { timestamp, close, adj_close })
    }
}

fn normalize_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Maps a provider CSV export (Yahoo-style `Date,Open,High,Low,Close,Adj Close,Volume`)
/// onto `PriceBar`s.
pub struct PriceCsvParser;

impl PriceCsvParser {
    /// Rows come back sorted by timestamp; a repeated timestamp keeps its first row.
    pub fn parse_reader<R: Read>(reader: R) -> Result<Vec<PriceBar>, EngineError> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let columns = ColumnMap::from_headers(rdr.headers()?)?;

        let mut bars = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let record = result?;
            bars.push(Self::parse_record(&record, &columns, idx + 2)?);
        }

        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        Ok(bars)
    }

    fn parse_record(
        record: &StringRecord,
        columns: &ColumnMap,
        line: usize,
    ) -> Result<PriceBar, EngineError> {
        let field = |pos: usize, name: &str| {
            record.get(pos).ok_or_else(|| {
                EngineError::CsvDataFormatError(format!("Missing '{}' field at line {}", name, line))
            })
        };
        let format_error = |name: &str, e: anyhow::Error| {
            EngineError::CsvDataFormatError(format!("Error parsing '{}' at line {}: {}", name, line, e))
        };

        let timestamp = provider_format::parse_timestamp(field(columns.timestamp, "timestamp")?)
            .map_err(|e| format_error("timestamp", e))?;
        let close = provider_format::parse_price(field(columns.close, "Close")?)
            .map_err(|e| format_error("Close", e))?;
        let adj_close = match columns.adj_close {
            Some(pos) => provider_format::parse_price(field(pos, "Adj Close")?)
                .map_err(|e| format_error("Adj Close", e))?,
            None => None,
        };

        Ok(PriceBar { timestamp, close, adj_close })
    }
}
