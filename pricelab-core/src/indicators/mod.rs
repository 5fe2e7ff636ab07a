//! Technical indicators over a single price side.
//!
//! Every function takes the full price series and returns outputs of the same
//! length, with `f64::NAN` marking indices where the indicator is not yet
//! defined. A period longer than the series yields all-NaN output; a period of
//! zero is rejected by the constructors and by [`IndicatorEngine`].
//!
//! No value at index `t` depends on prices after `t`.

pub mod atr;
pub mod bollinger;
pub mod cache;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use atr::{atr, true_range, wilder_smooth};
pub use bollinger::{bollinger, BollingerSeries};
pub use cache::{IndicatorEngine, IndicatorKey, IndicatorKind, IndicatorOutput, Source};
pub use ema::{ema, Ema};
pub use macd::{macd, MacdSeries};
pub use rsi::{rsi, Rsi};
pub use sma::{sma, Sma};

use crate::error::SimError;

/// Single-series indicator.
///
/// `compute` returns a vector the same length as `prices`; the first
/// `lookback()` entries are NaN.
pub trait Indicator: Send + Sync {
    /// Column-style name, e.g. "sma_20".
    fn name(&self) -> &str;

    /// Index of the first defined output.
    fn lookback(&self) -> usize;

    fn compute(&self, prices: &[f64]) -> Vec<f64>;
}

pub(crate) fn check_period(indicator: &'static str, period: usize) -> Result<(), SimError> {
    if period == 0 {
        Err(SimError::InvalidPeriod { indicator, period })
    } else {
        Ok(())
    }
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
