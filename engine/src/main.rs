// rsi-export entry point
use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use engine::config::settings::RsiSettings;
use engine::data::csv_writer::{write_report_to_dir, ExportFormat, TIMESTAMP_FORMAT};
use engine::data::market_data::MarketDataStore;
use engine::data::source::CsvDirectorySource;
use engine::data::xlsx_writer::write_report_xlsx;
use engine::models::{DateRange, RsiReport, RsiRequest};
use engine::services::RsiService;
use shared::models::{PriceField, TimeFrame};
use shared::utils::format_rounded;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Compute RSI for a ticker's price history and export it to CSV or Excel.
#[derive(Parser, Debug)]
#[command(name = "rsi-export", version)]
struct Cli {
    /// Ticker symbol, e.g. AAPL
    #[arg(short, long)]
    symbol: String,

    /// Days back from today (default from config)
    #[arg(long, conflicts_with_all = ["start", "end"])]
    days: Option<u32>,

    /// First visible date (YYYY-MM-DD)
    #[arg(long, requires = "end")]
    start: Option<NaiveDate>,

    /// Last visible date, inclusive (YYYY-MM-DD)
    #[arg(long, requires = "start")]
    end: Option<NaiveDate>,

    /// Bar interval: 1d or 1h
    #[arg(short, long, default_value = "1d")]
    interval: TimeFrame,

    /// RSI period
    #[arg(short, long)]
    period: Option<usize>,

    /// Extra days of history fetched before the visible window
    #[arg(long)]
    warmup_days: Option<u32>,

    /// Price column: close or adj_close (default from config)
    #[arg(long)]
    price_field: Option<PriceField>,

    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding {SYMBOL}_{interval}.csv price files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory the exports are written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Also write an .xlsx workbook
    #[arg(long)]
    excel: bool,

    /// Number of trailing rows to print
    #[arg(long)]
    preview: Option<usize>,
}

impl Cli {
    fn to_request(&self, settings: &RsiSettings) -> RsiRequest {
        let range = match (self.start, self.end) {
            (Some(start), Some(end)) => DateRange::Between { start, end },
            _ => DateRange::LastDays(self.days.unwrap_or(settings.default_lookback_days)),
        };
        let price_field = match self.price_field {
            Some(field) => field,
            None if settings.prefer_adjusted => PriceField::AdjClose,
            None => PriceField::Close,
        };
        RsiRequest::new(self.symbol.clone(), range)
            .with_timeframe(self.interval)
            .with_period(self.period.unwrap_or(settings.default_period))
            .with_warmup_days(self.warmup_days.unwrap_or(settings.default_warmup_days))
            .with_price_field(price_field)
    }
}

fn print_preview(report: &RsiReport, rows: usize, format: &ExportFormat) {
    println!(
        "{} | {} -> {} | interval {} | price {}",
        report.symbol, report.start, report.end, report.timeframe, report.price_field
    );
    println!("{:<20} {:>12} {:>8}", "Datetime", "Close", format!("RSI_{}", report.period));
    for row in report.tail(rows) {
        let rsi = row
            .rsi
            .map(|v| format_rounded(v, format.rsi_decimals))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<20} {:>12} {:>8}",
            row.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format_rounded(row.price, format.price_decimals),
            rsi
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => RsiSettings::load(path)?,
        None => RsiSettings::load_default()?,
    };
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = dir.clone();
    }
    if let Some(dir) = &cli.output_dir {
        settings.output_dir = dir.clone();
    }
    info!(data_dir = %settings.data_dir.display(), "Starting RSI exporter");

    let source = Arc::new(CsvDirectorySource::new(settings.data_dir.clone()));
    let service = RsiService::new(Arc::new(RwLock::new(MarketDataStore::new())), source);

    let request = cli.to_request(&settings);
    let report = match service.calculate(request).await {
        Ok(report) => report,
        Err(e) if e.is_user_error() => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to compute RSI for '{}'", cli.symbol))
        }
    };

    let format = settings.export_format();
    print_preview(&report, cli.preview.unwrap_or(settings.preview_rows), &format);

    if report.insufficient_history() {
        println!(
            "Not enough history for RSI({}) in this window. Try a larger --warmup-days.",
            report.period
        );
    }

    let path = write_report_to_dir(&settings.output_dir, &report, &format)?;
    println!("Saved {} rows to {}", report.rows.len(), path.display());
    if cli.excel || settings.export_excel {
        let path = write_report_xlsx(&settings.output_dir, &report, &format)?;
        println!("Saved {} rows to {}", report.rows.len(), path.display());
    }
    Ok(())
}
