// Indicator step of an RSI request: price selection, engine call, trimming
use shared::models::PriceBar;

use super::helpers::{effective_price_field, to_priced_series};
use crate::error::EngineError;
use crate::indicators::{IndicatorCalculator, Rsi};
use crate::models::{ResolvedRequest, RsiReport, RsiRow};

pub fn handle_calculate_rsi(
    request: &ResolvedRequest,
    bars: &[PriceBar],
) -> Result<RsiReport, EngineError> {
    let price_field = effective_price_field(bars, request.price_field);
    if price_field != request.price_field {
        tracing::info!(
            symbol = %request.symbol,
            requested = %request.price_field,
            using = %price_field,
            "Requested price field unavailable, falling back"
        );
    }

    let series = to_priced_series(bars, price_field)?;
    let calculator = Rsi::new(request.period)?;
    // Computed over warm-up and visible rows together, trimmed afterwards.
    let rsi = calculator.calculate(&series)?;

    let mut warmup_rows = 0;
    let mut rows = Vec::new();
    for (point, value) in series.points().iter().zip(rsi.points()) {
        if point.timestamp < request.visible_from {
            warmup_rows += 1;
        } else if point.timestamp < request.visible_to {
            rows.push(RsiRow {
                timestamp: point.timestamp,
                price: point.price,
                rsi: value.value,
            });
        }
    }

    let report = RsiReport {
        symbol: request.symbol.clone(),
        timeframe: request.timeframe,
        period: request.period,
        price_field,
        start: request.start,
        end: request.end,
        rows,
        warmup_rows,
    };

    if report.insufficient_history() {
        tracing::warn!(
            symbol = %request.symbol,
            indicator = %calculator.name(),
            priced_rows = series.len(),
            "Not enough history for a defined RSI in the visible window"
        );
    }
    Ok(report)
}
