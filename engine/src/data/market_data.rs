// Cache of raw provider fetches. Indicators are never stored here.
use chrono::{DateTime, Utc};
use shared::models::{PriceBar, TimeFrame};
use std::collections::HashMap;

#[derive(Debug, Default)]
struct CachedBars {
    bars: Vec<PriceBar>,
    // Half-open [from, to) ranges already fetched, kept merged and sorted.
    fetched: Vec<(DateTime<Utc>, DateTime<Utc>)>,
}

pub struct MarketDataStore {
    data: HashMap<(String, TimeFrame), CachedBars>,
}

impl MarketDataStore {
    pub fn new() -> Self {
        MarketDataStore {
            data: HashMap::new(),
        }
    }

    /// Records a completed fetch of `[from, to)` and merges its bars.
    pub fn add_bars(
        &mut self,
        symbol: &str,
        timeframe: TimeFrame,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        new_bars: Vec<PriceBar>,
    ) {
        let entry = self.data.entry((symbol.to_string(), timeframe)).or_default();

        // Existing rows win over refetched ones with the same timestamp
        entry.bars.extend(new_bars);
        entry.bars.sort_by_key(|b| b.timestamp);
        entry.bars.dedup_by_key(|b| b.timestamp);

        entry.fetched.push((from, to));
        entry.fetched.sort_by_key(|r| r.0);
        let mut merged: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::with_capacity(entry.fetched.len());
        for (start, end) in entry.fetched.drain(..) {
            match merged.last_mut() {
                Some(last) if start <= last.1 => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }
        entry.fetched = merged;
    }

    /// True when a single earlier fetch already spans `[from, to)`.
    pub fn covers(&self, symbol: &str, timeframe: TimeFrame, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.data
            .get(&(symbol.to_string(), timeframe))
            .map_or(false, |cached| {
                cached.fetched.iter().any(|(start, end)| *start <= from && to <= *end)
            })
    }

    /// Bars with `from <= timestamp < to`.
    pub fn get_bars(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Option<Vec<PriceBar>> {
        self.data.get(&(symbol.to_string(), timeframe)).map(|cached| {
            cached
                .bars
                .iter()
                .filter(|b| from.map_or(true, |start| b.timestamp >= start))
                .filter(|b| to.map_or(true, |end| b.timestamp < end))
                .cloned()
                .collect()
        })
    }
}

impl Default for MarketDataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn bar(d: u32, close: f64) -> PriceBar {
        PriceBar { timestamp: day(d), close: Some(close), adj_close: None }
    }

    #[test]
    fn test_add_and_get_bars_in_range() {
        let mut store = MarketDataStore::new();
        store.add_bars("AAPL", TimeFrame::Day1, day(1), day(6), vec![bar(3, 3.0), bar(1, 1.0), bar(5, 5.0)]);

        let all = store.get_bars("AAPL", TimeFrame::Day1, None, None).unwrap();
        assert_eq!(all.iter().map(|b| b.close.unwrap()).collect::<Vec<_>>(), vec![1.0, 3.0, 5.0]);

        let window = store.get_bars("AAPL", TimeFrame::Day1, Some(day(2)), Some(day(5))).unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].timestamp, day(3));
    }

    #[test]
    fn test_unknown_symbol_or_timeframe() {
        let mut store = MarketDataStore::new();
        store.add_bars("AAPL", TimeFrame::Day1, day(1), day(2), vec![bar(1, 1.0)]);
        assert!(store.get_bars("MSFT", TimeFrame::Day1, None, None).is_none());
        assert!(store.get_bars("AAPL", TimeFrame::Hour1, None, None).is_none());
        assert!(!store.covers("AAPL", TimeFrame::Hour1, day(1), day(2)));
    }

    #[test]
    fn test_covers_merged_ranges() {
        let mut store = MarketDataStore::new();
        store.add_bars("AAPL", TimeFrame::Day1, day(1), day(10), vec![]);
        store.add_bars("AAPL", TimeFrame::Day1, day(10), day(20), vec![]);

        assert!(store.covers("AAPL", TimeFrame::Day1, day(3), day(15)));
        assert!(!store.covers("AAPL", TimeFrame::Day1, day(3), day(21)));
        assert!(!store.covers("AAPL", TimeFrame::Day1, day(1) - Duration::days(1), day(5)));
    }

    #[test]
    fn test_refetch_does_not_duplicate_rows() {
        let mut store = MarketDataStore::new();
        store.add_bars("AAPL", TimeFrame::Day1, day(1), day(4), vec![bar(1, 1.0), bar(2, 2.0)]);
        store.add_bars("AAPL", TimeFrame::Day1, day(2), day(4), vec![bar(2, 9.0), bar(3, 3.0)]);

        let all = store.get_bars("AAPL", TimeFrame::Day1, None, None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].close, Some(2.0));
    }
}
