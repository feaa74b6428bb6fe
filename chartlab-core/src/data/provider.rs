//! Candle provider trait and structured error types.
//!
//! The grader never owns a price store. Whatever holds price history (a
//! database, a cache, a CSV export) sits behind [`CandleProvider`] and hands
//! back an already-validated [`CandleSeries`].

use std::collections::HashMap;

use thiserror::Error;

use crate::domain::{Candle, CandleSeries, SeriesError, Timeframe};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("symbol not found: {symbol} ({timeframe})")]
    SymbolNotFound { symbol: String, timeframe: Timeframe },

    #[error("invalid candles for {symbol}: {source}")]
    InvalidSeries {
        symbol: String,
        #[source]
        source: SeriesError,
    },

    #[error("provider error: {0}")]
    Other(String),
}

/// Source of candle history for one (symbol, timeframe) pair.
pub trait CandleProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn candles(&self, symbol: &str, timeframe: Timeframe) -> Result<CandleSeries, ProviderError>;
}

/// Provider backed by a map, for tests and CLI use.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    series: HashMap<(String, Timeframe), CandleSeries>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, timeframe: Timeframe, series: CandleSeries) {
        self.series.insert((symbol.into().to_ascii_uppercase(), timeframe), series);
    }

    /// Validates raw candles before storing them.
    pub fn insert_candles(
        &mut self,
        symbol: impl Into<String>,
        timeframe: Timeframe,
        candles: Vec<Candle>,
    ) -> Result<(), ProviderError> {
        let symbol = symbol.into();
        let series = CandleSeries::new(candles).map_err(|source| ProviderError::InvalidSeries {
            symbol: symbol.clone(),
            source,
        })?;
        self.insert(symbol, timeframe, series);
        Ok(())
    }

    pub fn with_series(mut self, symbol: impl Into<String>, timeframe: Timeframe, series: CandleSeries) -> Self {
        self.insert(symbol, timeframe, series);
        self
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl CandleProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn candles(&self, symbol: &str, timeframe: Timeframe) -> Result<CandleSeries, ProviderError> {
        self.series
            .get(&(symbol.to_ascii_uppercase(), timeframe))
            .cloned()
            .ok_or_else(|| ProviderError::SymbolNotFound {
                symbol: symbol.to_string(),
                timeframe,
            })
    }
}
