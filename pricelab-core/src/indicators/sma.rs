//! Simple Moving Average (SMA).
//!
//! Rolling mean over a trailing window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::{check_period, Indicator};
use crate::error::SimError;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, SimError> {
        check_period("sma", period)?;
        Ok(Self {
            period,
            name: format!("sma_{period}"),
        })
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, prices: &[f64]) -> Vec<f64> {
        sma(prices, self.period)
    }
}

/// SMA of `values`; all NaN when `period` is 0 or exceeds the length.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    let mut sum: f64 = values[..period].iter().sum();
    result[period - 1] = sum / period as f64;

    // Roll the window forward
    for i in period..n {
        sum += values[i] - values[i - period];
        result[i] = sum / period as f64;
    }

    result
}
