// Excel export of RSI reports, same columns and rounding as the CSV export.
use rust_xlsxwriter::Workbook;
use shared::utils::round_to;
use std::path::{Path, PathBuf};

use super::csv_writer::{export_file_name, ExportFormat, TIMESTAMP_FORMAT};
use crate::error::EngineError;
use crate::models::RsiReport;

/// `{SYMBOL}_RSI{period}_{start}_{end}.xlsx`
pub fn xlsx_file_name(report: &RsiReport) -> String {
    export_file_name(&report.symbol, report.period, report.start, report.end)
        .replace(".csv", ".xlsx")
}

/// Writes the report into `dir` as a single-sheet workbook. Undefined RSI
/// values are left as blank cells.
pub fn write_report_xlsx(
    dir: &Path,
    report: &RsiReport,
    format: &ExportFormat,
) -> Result<PathBuf, EngineError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(xlsx_file_name(report));

    let mut workbook = Workbook::new();
    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&format!("RSI_{}", report.period))?;
        worksheet.write_string(0, 0, "Datetime")?;
        worksheet.write_string(0, 1, "Close")?;
        worksheet.write_string(0, 2, &format!("RSI_{}", report.period))?;

        for (i, row) in report.rows.iter().enumerate() {
            // Past the sheet's row limit the write itself fails
            let line = (i + 1) as u32;
            worksheet.write_string(line, 0, &row.timestamp.format(TIMESTAMP_FORMAT).to_string())?;
            worksheet.write_number(line, 1, round_to(row.price, format.price_decimals))?;
            if let Some(rsi) = row.rsi {
                worksheet.write_number(line, 2, round_to(rsi, format.rsi_decimals))?;
            }
        }
    }
    workbook.save(&path)?;

    tracing::info!(path = %path.display(), rows = report.rows.len(), "Exported RSI workbook");
    Ok(path)
}
