//! Bollinger Bands: moving average +/- a multiple of the rolling standard deviation.
//!
//! - Middle: SMA(period), exactly the [`sma`] output
//! - Upper: middle + k * stddev(period)
//! - Lower: middle - k * stddev(period)
//!
//! Uses population stddev (divide by N).
//! Lookback: period - 1.

use std::ops::Range;

use super::sma::sma;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

impl BollingerSeries {
    pub fn len(&self) -> usize {
        self.middle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middle.is_empty()
    }

    pub fn slice(&self, range: Range<usize>) -> Self {
        Self {
            upper: self.upper[range.clone()].to_vec(),
            middle: self.middle[range.clone()].to_vec(),
            lower: self.lower[range].to_vec(),
        }
    }
}

/// `k` is assumed finite and non-negative; [`crate::indicators::IndicatorEngine`] validates it.
pub fn bollinger(prices: &[f64], period: usize, k: f64) -> BollingerSeries {
    let n = prices.len();
    let middle = sma(prices, period);
    let mut upper = vec![f64::NAN; n];
    let mut lower = vec![f64::NAN; n];

    if period > 0 {
        for i in (period - 1)..n {
            let mean = middle[i];
            let window = &prices[i + 1 - period..=i];
            let variance = window.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / period as f64;
            let width = k * variance.sqrt();
            upper[i] = mean + width;
            lower[i] = mean - width;
        }
    }

    BollingerSeries {
        upper,
        middle,
        lower,
    }
}
