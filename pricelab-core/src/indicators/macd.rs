//! Moving Average Convergence/Divergence (MACD).
//!
//! macd = EMA(fast) - EMA(slow). The signal line is an EMA of the defined
//! part of the MACD line, written back at the original indices.

use std::ops::Range;

use super::ema::ema;

/// Three aligned series, each as long as the input prices.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl MacdSeries {
    pub fn len(&self) -> usize {
        self.macd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macd.is_empty()
    }

    pub fn slice(&self, range: Range<usize>) -> Self {
        Self {
            macd: self.macd[range.clone()].to_vec(),
            signal: self.signal[range.clone()].to_vec(),
            histogram: self.histogram[range].to_vec(),
        }
    }
}

/// Periods are assumed non-zero; [`crate::indicators::IndicatorEngine`] validates them.
pub fn macd(prices: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let n = prices.len();
    let fast_ema = ema(prices, fast);
    let slow_ema = ema(prices, slow);

    let line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();

    let defined: Vec<usize> = (0..n).filter(|&i| !line[i].is_nan()).collect();
    let tail: Vec<f64> = defined.iter().map(|&i| line[i]).collect();
    let tail_signal = ema(&tail, signal);

    let mut signal_line = vec![f64::NAN; n];
    let mut histogram = vec![f64::NAN; n];
    for (&i, &s) in defined.iter().zip(&tail_signal) {
        if !s.is_nan() {
            signal_line[i] = s;
            histogram[i] = line[i] - s;
        }
    }

    MacdSeries {
        macd: line,
        signal: signal_line,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn warmup_boundaries() {
        let m = macd(&ramp(60), 12, 26, 9);
        assert_eq!(m.len(), 60);
        assert!(m.macd[..25].iter().all(|v| v.is_nan()));
        assert!(m.macd[25..].iter().all(|v| v.is_finite()));
        // signal needs 9 defined MACD values: first at 25 + 8
        assert!(m.signal[..33].iter().all(|v| v.is_nan()));
        assert!(m.signal[33..].iter().all(|v| v.is_finite()));
    }

    #[test]
    fn histogram_is_macd_minus_signal() {
        let prices: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let m = macd(&prices, 12, 26, 9);
        for i in 0..80 {
            if m.histogram[i].is_nan() {
                assert!(m.signal[i].is_nan());
            } else {
                assert_approx(m.histogram[i], m.macd[i] - m.signal[i], DEFAULT_EPSILON);
            }
        }
    }

    #[test]
    fn linear_ramp_converges_to_constant_gap() {
        // On a ramp with slope 1, EMA(p) lags by (p-1)/2, so macd → (26-12)/2 = 7.
        let m = macd(&ramp(400), 12, 26, 9);
        assert_approx(m.macd[399], 7.0, 1e-6);
        assert_approx(m.histogram[399], 0.0, 1e-6);
    }

    #[test]
    fn short_series_is_all_nan() {
        let m = macd(&ramp(20), 12, 26, 9);
        assert!(m.macd.iter().all(|v| v.is_nan()));
        assert!(m.signal.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn slice_keeps_alignment() {
        let m = macd(&ramp(60), 12, 26, 9);
        let s = m.slice(30..40);
        assert_eq!(s.len(), 10);
        assert_eq!(s.macd[..], m.macd[30..40]);
        assert_eq!(s.histogram[5].to_bits(), m.histogram[35].to_bits());
    }
}
