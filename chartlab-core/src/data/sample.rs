//! Synthetic practice charts.
//!
//! A practice chart is a seeded random walk. Seeds for the nth chart of a
//! (symbol, timeframe) pair are derived with BLAKE3 from a master seed, so the
//! same chart comes back regardless of the order charts are requested in.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{Candle, CandleSeries, SeriesError, Timeframe};

/// 2021-01-01 00:00 UTC.
pub const SAMPLE_EPOCH: i64 = 1_609_459_200;

const MAX_MOVE: f64 = 5.0;
const MAX_WICK: f64 = 2.0;
const MIN_PRICE: f64 = 0.01;

fn cents(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

/// Random-walk candles: each close moves up to ±5 from its open, wicks extend
/// up to 2 beyond the body, prices are rounded to cents and floored at 0.01.
///
/// Fails only for a non-finite `base_price`, reported against the first candle.
pub fn random_candles(
    count: usize,
    base_price: f64,
    timeframe: Timeframe,
    seed: u64,
) -> Result<CandleSeries, SeriesError> {
    if !base_price.is_finite() {
        return Err(SeriesError::NonFinite { index: 0 });
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let interval = timeframe.interval_secs();
    let mut current = base_price.max(MIN_PRICE);
    let mut candles = Vec::with_capacity(count);

    for i in 0..count {
        let open = current;
        let close = (open + rng.gen_range(-MAX_MOVE..=MAX_MOVE)).max(MIN_PRICE);
        let high = open.max(close) + rng.gen_range(0.0..=MAX_WICK);
        let low = (open.min(close) - rng.gen_range(0.0..=MAX_WICK)).max(MIN_PRICE);

        candles.push(Candle::new(
            SAMPLE_EPOCH + i as i64 * interval,
            cents(open),
            cents(high),
            cents(low),
            cents(close),
        ));
        current = close;
    }

    CandleSeries::new(candles)
}

/// Per-chart seed derivation for practice sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PracticeSeeds {
    master_seed: u64,
}

impl PracticeSeeds {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn seed_for(&self, symbol: &str, timeframe: Timeframe, chart: u32) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(symbol.as_bytes());
        hasher.update(timeframe.label().as_bytes());
        hasher.update(&chart.to_le_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    /// The nth practice chart for a symbol and timeframe.
    pub fn chart(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        chart: u32,
        count: usize,
        base_price: f64,
    ) -> Result<CandleSeries, SeriesError> {
        random_candles(count, base_price, timeframe, self.seed_for(symbol, timeframe, chart))
    }
}
