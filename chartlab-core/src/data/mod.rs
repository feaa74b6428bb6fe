//! Candle sources and synthetic practice data.

pub mod provider;
pub mod sample;

pub use provider::{CandleProvider, InMemoryProvider, ProviderError};
pub use sample::{random_candles, PracticeSeeds};
