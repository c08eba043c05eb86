// Fetch-or-cache step of an RSI request
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::data::market_data::MarketDataStore;
use crate::data::source::{FetchQuery, MarketDataSource};
use crate::error::EngineError;
use crate::models::ResolvedRequest;
use shared::models::PriceBar;

/// Raw bars covering the warm-up and visible windows of `request`.
pub async fn handle_load_prices(
    request: &ResolvedRequest,
    market_data_store: Arc<RwLock<MarketDataStore>>,
    source: &dyn MarketDataSource,
) -> Result<Vec<PriceBar>, EngineError> {
    let (from, to) = (request.fetch_from, request.visible_to);

    let cached = {
        let store = market_data_store.read().await;
        if store.covers(&request.symbol, request.timeframe, from, to) {
            store.get_bars(&request.symbol, request.timeframe, Some(from), Some(to))
        } else {
            None
        }
    };

    let bars = match cached {
        Some(bars) => {
            tracing::debug!(symbol = %request.symbol, count = bars.len(), "Serving bars from cache");
            bars
        }
        None => {
            let query = FetchQuery {
                symbol: request.symbol.clone(),
                timeframe: request.timeframe,
                from,
                to,
            };
            let bars = source.fetch(&query).await?;
            tracing::info!(
                symbol = %request.symbol,
                timeframe = %request.timeframe,
                count = bars.len(),
                "Fetched bars from market data source"
            );
            // Empty fetches stay uncached so a later retry can see new data.
            if !bars.is_empty() {
                let mut store = market_data_store.write().await;
                store.add_bars(&request.symbol, request.timeframe, from, to, bars.clone());
            }
            bars
        }
    };

    if bars.is_empty() {
        tracing::warn!(symbol = %request.symbol, timeframe = %request.timeframe, "No market data found for request");
        return Err(EngineError::MarketDataError(format!(
            "No data found for symbol '{}' between {} and {} ({})",
            request.symbol, request.start, request.end, request.timeframe
        )));
    }
    Ok(bars)
}
