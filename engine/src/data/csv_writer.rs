// CSV export of RSI reports. Rounding is applied here and nowhere upstream.
use chrono::NaiveDate;
use csv::Writer;
use shared::utils::format_rounded;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::models::RsiReport;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportFormat {
    pub price_decimals: u32,
    pub rsi_decimals: u32,
}

impl Default for ExportFormat {
    fn default() -> Self {
        Self {
            price_decimals: 4,
            rsi_decimals: 2,
        }
    }
}

/// `{SYMBOL}_RSI{period}_{start}_{end}.csv`
pub fn export_file_name(symbol: &str, period: usize, start: NaiveDate, end: NaiveDate) -> String {
    format!("{}_RSI{}_{}_{}.csv", symbol, period, start, end)
}

pub fn write_report<W: Write>(
    writer: W,
    report: &RsiReport,
    format: &ExportFormat,
) -> Result<(), EngineError> {
    let mut wtr = Writer::from_writer(writer);
    let rsi_header = format!("RSI_{}", report.period);
    wtr.write_record(["Datetime", "Close", rsi_header.as_str()])?;

    for row in &report.rows {
        let rsi = row
            .rsi
            .map(|v| format_rounded(v, format.rsi_decimals))
            .unwrap_or_default();
        wtr.write_record([
            row.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format_rounded(row.price, format.price_decimals),
            rsi,
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the report into `dir` under its conventional file name.
pub fn write_report_to_dir(
    dir: &Path,
    report: &RsiReport,
    format: &ExportFormat,
) -> Result<PathBuf, EngineError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(&report.symbol, report.period, report.start, report.end));
    let file = File::create(&path)?;
    write_report(file, report, format)?;
    tracing::info!(path = %path.display(), rows = report.rows.len(), "Exported RSI report");
    Ok(path)
}
