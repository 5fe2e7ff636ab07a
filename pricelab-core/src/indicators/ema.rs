//! Exponential Moving Average (EMA).
//!
//! `ema[t] = ema[t-1] + k * (price[t] - ema[t-1])`, `k = 2 / (period + 1)`.
//! First value at index `period - 1`.

use super::{check_period, Indicator};
use crate::error::SimError;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self, SimError> {
        check_period("ema", period)?;
        Ok(Self {
            period,
            name: format!("ema_{period}"),
        })
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, prices: &[f64]) -> Vec<f64> {
        ema(prices, self.period)
    }
}

/// EMA of `values`, seeded with the mean of the first `period` entries.
///
/// Also drives the MACD lines. A NaN inside the seed window leaves the output
/// all NaN; a NaN after it cuts the line off from that index on.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let (window, rest) = values.split_at(period);
    if window.iter().any(|v| v.is_nan()) {
        return out;
    }
    let k = 2.0 / (period as f64 + 1.0);
    let mut level = window.iter().sum::<f64>() / period as f64;
    out[period - 1] = level;

    for (slot, &price) in out[period..].iter_mut().zip(rest) {
        if price.is_nan() {
            break;
        }
        level += k * (price - level);
        *slot = level;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn single_period_tracks_prices() {
        let prices = [101.5, 99.25, 100.75];
        let out = ema(&prices, 1);
        for (got, want) in out.iter().zip(prices) {
            assert_approx(*got, want, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn hand_checked_period_4() {
        // k = 0.4; seed = mean(2, 4, 6, 8) = 5
        // 5 + 0.4 * (10 - 5) = 7
        // 7 + 0.4 * (4 - 7) = 5.8
        let out = ema(&[2.0, 4.0, 6.0, 8.0, 10.0, 4.0], 4);
        assert!(out[..3].iter().all(|v| v.is_nan()));
        assert_approx(out[3], 5.0, DEFAULT_EPSILON);
        assert_approx(out[4], 7.0, DEFAULT_EPSILON);
        assert_approx(out[5], 5.8, DEFAULT_EPSILON);
    }

    #[test]
    fn lags_a_rising_ramp() {
        let ramp: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let out = ema(&ramp, 9);
        for i in 9..50 {
            assert!(out[i] < ramp[i], "ema above price at {i}");
            assert!(out[i] > out[i - 1]);
        }
    }

    #[test]
    fn nan_in_seed_window_blanks_everything() {
        let out = ema(&[1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0], 3);
        assert!(out.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn nan_after_seed_cuts_line() {
        let out = ema(&[3.0, 3.0, 3.0, f64::NAN, 3.0], 3);
        assert_approx(out[2], 3.0, DEFAULT_EPSILON);
        assert!(out[3].is_nan() && out[4].is_nan());
    }

    #[test]
    fn too_short_is_all_nan() {
        assert!(ema(&[1.0, 2.0], 5).iter().all(|v| v.is_nan()));
        assert_eq!(Ema::new(20).unwrap().lookback(), 19);
        assert!(Ema::new(0).is_err());
    }
}
