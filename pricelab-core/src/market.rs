//! `MarketData`: the thread-safe facade over one price path and its indicators.
//!
//! Generation is serialized behind a mutex, so concurrent readers observe the
//! same sequence a single-threaded caller would. Indicators need the finished
//! series; the first indicator query completes the path and freezes an
//! immutable snapshot that every later read shares.

use std::ops::RangeBounds;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::indicators::{
    BollingerSeries, IndicatorEngine, IndicatorKey, IndicatorKind, IndicatorOutput, MacdSeries,
    Source,
};
use crate::path::{resolve_range, PricePath, PriceSeries};
use crate::quote::{Quote, Side};
use crate::rng::SimRng;
use crate::schedule::{RegimeAssignment, Schedule};

pub const DEFAULT_SMA_PERIOD: usize = 20;
pub const DEFAULT_EMA_PERIOD: usize = 20;
pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_ATR_PERIOD: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerParams {
    pub period: usize,
    pub k: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            period: 20,
            k: 2.0,
        }
    }
}

pub struct MarketData {
    path: Mutex<PricePath>,
    frozen: OnceLock<Arc<PriceSeries>>,
    indicators: IndicatorEngine,
    total_days: usize,
    seed: u64,
}

impl MarketData {
    /// Validate inputs and build a lazily generated market.
    ///
    /// With `seed = None` a seed is drawn from entropy; [`MarketData::seed`]
    /// reports it so the run can be replayed.
    pub fn new(
        start_buy: f64,
        start_sell: f64,
        assignments: Vec<RegimeAssignment>,
        seed: Option<u64>,
    ) -> Result<Self, SimError> {
        let schedule = Schedule::new(assignments)?;
        let rng = match seed {
            Some(seed) => SimRng::seeded(seed),
            None => SimRng::from_entropy(),
        };
        let seed = rng.seed();
        let path = PricePath::new(Quote::new(start_buy, start_sell), schedule, rng)?;
        let total_days = path.total_days();
        tracing::debug!(start_buy, start_sell, total_days, seed, "market created");

        Ok(Self {
            path: Mutex::new(path),
            frozen: OnceLock::new(),
            indicators: IndicatorEngine::new(),
            total_days,
            seed,
        })
    }

    pub fn total_days(&self) -> usize {
        self.total_days
    }

    /// Full series length (`total_days + 1`).
    pub fn len(&self) -> usize {
        self.total_days + 1
    }

    /// Always false: day 0 exists for every market.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn assignments(&self) -> Vec<RegimeAssignment> {
        self.path.lock().schedule().assignments().to_vec()
    }

    /// The finished series, generating any remaining days on first call.
    pub fn series(&self) -> Arc<PriceSeries> {
        let frozen = self.frozen.get_or_init(|| {
            let mut path = self.path.lock();
            let series = path.complete().clone();
            tracing::debug!(len = series.len(), "series frozen");
            Arc::new(series)
        });
        Arc::clone(frozen)
    }

    // ── Prices ──────────────────────────────────────────────────────

    pub fn prices(&self, side: Side, range: impl RangeBounds<usize>) -> Result<Vec<f64>, SimError> {
        match self.frozen.get() {
            Some(series) => {
                let range = resolve_range(range, series.len())?;
                Ok(series.side(side)[range].to_vec())
            }
            None => self.path.lock().prices(side, range),
        }
    }

    pub fn buy_prices(&self, range: impl RangeBounds<usize>) -> Result<Vec<f64>, SimError> {
        self.prices(Side::Buy, range)
    }

    pub fn sell_prices(&self, range: impl RangeBounds<usize>) -> Result<Vec<f64>, SimError> {
        self.prices(Side::Sell, range)
    }

    /// Two-phase incremental read; see [`crate::path::Cursor`].
    pub fn next_buy_price(&self) -> Option<f64> {
        self.path.lock().next_buy_price()
    }

    pub fn next_sell_price(&self) -> Option<f64> {
        self.path.lock().next_sell_price()
    }

    /// Both sides of the cursor day under one lock.
    pub fn next_quote(&self) -> Option<Quote> {
        self.path.lock().next_quote()
    }

    // ── Indicators ──────────────────────────────────────────────────

    /// Cached full-length output for `key`.
    pub fn indicator(&self, key: IndicatorKey) -> Result<Arc<IndicatorOutput>, SimError> {
        let series = self.series();
        self.indicators.get(key, &series)
    }

    /// Number of indicator results held in the cache.
    pub fn cached_indicators(&self) -> usize {
        self.indicators.cached_len()
    }

    fn line(
        &self,
        source: Source,
        kind: IndicatorKind,
        range: impl RangeBounds<usize>,
    ) -> Result<Vec<f64>, SimError> {
        let range = resolve_range(range, self.len())?;
        let output = self.indicator(IndicatorKey::new(source, kind))?;
        match output.as_line() {
            Some(values) => Ok(values[range].to_vec()),
            None => Err(mismatch(kind)),
        }
    }

    pub fn sma(
        &self,
        side: Side,
        period: usize,
        range: impl RangeBounds<usize>,
    ) -> Result<Vec<f64>, SimError> {
        self.line(side.into(), IndicatorKind::Sma { period }, range)
    }

    pub fn ema(
        &self,
        side: Side,
        period: usize,
        range: impl RangeBounds<usize>,
    ) -> Result<Vec<f64>, SimError> {
        self.line(side.into(), IndicatorKind::Ema { period }, range)
    }

    pub fn rsi(
        &self,
        side: Side,
        period: usize,
        range: impl RangeBounds<usize>,
    ) -> Result<Vec<f64>, SimError> {
        self.line(side.into(), IndicatorKind::Rsi { period }, range)
    }

    pub fn macd(
        &self,
        side: Side,
        params: MacdParams,
        range: impl RangeBounds<usize>,
    ) -> Result<MacdSeries, SimError> {
        let kind = IndicatorKind::Macd {
            fast: params.fast,
            slow: params.slow,
            signal: params.signal,
        };
        let range = resolve_range(range, self.len())?;
        let output = self.indicator(IndicatorKey::new(side, kind))?;
        match output.as_macd() {
            Some(m) => Ok(m.slice(range)),
            None => Err(mismatch(kind)),
        }
    }

    pub fn bollinger(
        &self,
        side: Side,
        params: BollingerParams,
        range: impl RangeBounds<usize>,
    ) -> Result<BollingerSeries, SimError> {
        let kind = IndicatorKind::bollinger(params.period, params.k);
        let range = resolve_range(range, self.len())?;
        let output = self.indicator(IndicatorKey::new(side, kind))?;
        match output.as_bollinger() {
            Some(b) => Ok(b.slice(range)),
            None => Err(mismatch(kind)),
        }
    }

    /// Average true range over both sides.
    pub fn atr(&self, period: usize, range: impl RangeBounds<usize>) -> Result<Vec<f64>, SimError> {
        self.line(Source::Both, IndicatorKind::Atr { period }, range)
    }

    pub fn buy_sma(
        &self,
        period: usize,
        range: impl RangeBounds<usize>,
    ) -> Result<Vec<f64>, SimError> {
        self.sma(Side::Buy, period, range)
    }

    pub fn sell_sma(
        &self,
        period: usize,
        range: impl RangeBounds<usize>,
    ) -> Result<Vec<f64>, SimError> {
        self.sma(Side::Sell, period, range)
    }

    pub fn buy_ema(
        &self,
        period: usize,
        range: impl RangeBounds<usize>,
    ) -> Result<Vec<f64>, SimError> {
        self.ema(Side::Buy, period, range)
    }

    pub fn sell_ema(
        &self,
        period: usize,
        range: impl RangeBounds<usize>,
    ) -> Result<Vec<f64>, SimError> {
        self.ema(Side::Sell, period, range)
    }

    pub fn buy_rsi(
        &self,
        period: usize,
        range: impl RangeBounds<usize>,
    ) -> Result<Vec<f64>, SimError> {
        self.rsi(Side::Buy, period, range)
    }

    pub fn sell_rsi(
        &self,
        period: usize,
        range: impl RangeBounds<usize>,
    ) -> Result<Vec<f64>, SimError> {
        self.rsi(Side::Sell, period, range)
    }

    pub fn buy_macd(
        &self,
        params: MacdParams,
        range: impl RangeBounds<usize>,
    ) -> Result<MacdSeries, SimError> {
        self.macd(Side::Buy, params, range)
    }

    pub fn sell_macd(
        &self,
        params: MacdParams,
        range: impl RangeBounds<usize>,
    ) -> Result<MacdSeries, SimError> {
        self.macd(Side::Sell, params, range)
    }

    pub fn buy_bollinger(
        &self,
        params: BollingerParams,
        range: impl RangeBounds<usize>,
    ) -> Result<BollingerSeries, SimError> {
        self.bollinger(Side::Buy, params, range)
    }

    pub fn sell_bollinger(
        &self,
        params: BollingerParams,
        range: impl RangeBounds<usize>,
    ) -> Result<BollingerSeries, SimError> {
        self.bollinger(Side::Sell, params, range)
    }
}

impl std::fmt::Debug for MarketData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketData")
            .field("total_days", &self.total_days)
            .field("seed", &self.seed)
            .field("frozen", &self.frozen.get().is_some())
            .field("cached_indicators", &self.indicators.cached_len())
            .finish()
    }
}

fn mismatch(kind: IndicatorKind) -> SimError {
    SimError::InvalidParameter {
        indicator: kind.name(),
        reason: "cached output has an unexpected shape".to_string(),
    }
}
