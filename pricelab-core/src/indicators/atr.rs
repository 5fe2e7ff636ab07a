//! Average True Range (ATR) over a buy/sell quote series.
//!
//! With no explicit OHLC data the buy price stands in for the high and the
//! sell price for both the low and the close.
//! True Range: max(buy - sell, |buy - prev_sell|, |sell - prev_sell|)
//! ATR uses Wilder smoothing (alpha = 1/period) seeded with the mean of the
//! first `period` true ranges.
//! Lookback: period - 1.

/// True Range series. TR[0] = buy[0] - sell[0] (no previous close).
pub fn true_range(buy: &[f64], sell: &[f64]) -> Vec<f64> {
    let n = buy.len().min(sell.len());
    let mut tr = vec![f64::NAN; n];
    if n == 0 {
        return tr;
    }

    tr[0] = buy[0] - sell[0];
    for i in 1..n {
        let prev_close = sell[i - 1];
        tr[i] = (buy[i] - sell[i])
            .max((buy[i] - prev_close).abs())
            .max((sell[i] - prev_close).abs());
    }
    tr
}

/// Wilder smoothing seeded at index `period - 1` with the mean of the first
/// `period` values. All NaN when the series is shorter than `period`.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n < period || period == 0 {
        return result;
    }

    let seed = values[..period].iter().sum::<f64>() / period as f64;
    result[period - 1] = seed;

    let alpha = 1.0 / period as f64;
    let mut prev = seed;
    for i in period..n {
        let smoothed = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = smoothed;
        prev = smoothed;
    }

    result
}

pub fn atr(buy: &[f64], sell: &[f64], period: usize) -> Vec<f64> {
    wilder_smooth(&true_range(buy, sell), period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn true_range_basic() {
        let buy = [105.0, 108.0, 107.0];
        let sell = [95.0, 100.0, 98.0];
        let tr = true_range(&buy, &sell);
        assert_approx(tr[0], 10.0, DEFAULT_EPSILON);
        // max(8, |108-95|, |100-95|) = 13
        assert_approx(tr[1], 13.0, DEFAULT_EPSILON);
        // max(9, |107-100|, |98-100|) = 9
        assert_approx(tr[2], 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn true_range_gap_down() {
        // prev sell 100, today 90/89: |89 - 100| = 11 dominates
        let tr = true_range(&[101.0, 90.0], &[100.0, 89.0]);
        assert_approx(tr[1], 11.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_period_3() {
        let buy = [105.0, 108.0, 107.0, 103.0, 106.0];
        let sell = [95.0, 100.0, 98.0, 97.0, 100.0];
        // TR = [10, 13, 9, 6, 9]
        let result = atr(&buy, &sell, 3);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        // Seed: ATR[2] = mean(10, 13, 9) = 32/3
        assert_approx(result[2], 32.0 / 3.0, DEFAULT_EPSILON);
        // ATR[3] = (1/3)*6 + (2/3)*(32/3) = 2 + 64/9
        assert_approx(result[3], 2.0 + 64.0 / 9.0, DEFAULT_EPSILON);
        assert!(result.iter().skip(2).all(|&v| v >= 0.0));
    }

    #[test]
    fn atr_short_series_is_nan() {
        let result = atr(&[101.0, 102.0], &[100.0, 101.0], 3);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn constant_spread_without_moves() {
        let result = atr(&[101.0; 20], &[100.0; 20], 5);
        for &v in &result[4..] {
            assert_approx(v, 1.0, DEFAULT_EPSILON);
        }
    }
}
