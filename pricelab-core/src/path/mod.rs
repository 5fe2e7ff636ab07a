//! Price-path engine: lazy, deterministic day-by-day generation.
//!
//! [`PricePath::advance_day`] is the only place a quote is produced. Batch
//! reads call [`PricePath::ensure_generated`], which loops it; the incremental
//! accessors read through the [`Cursor`]. Both therefore observe the same
//! sequence for a given seed.

pub mod cursor;
pub mod series;

pub use cursor::{Cursor, CursorState};
pub use series::{resolve_range, PriceSeries};

use std::ops::RangeBounds;

use crate::error::SimError;
use crate::quote::{Quote, Side};
use crate::regime::StepInput;
use crate::rng::SimRng;
use crate::schedule::Schedule;

#[derive(Debug, Clone)]
pub struct PricePath {
    series: PriceSeries,
    schedule: Schedule,
    rng: SimRng,
    cursor: Cursor,
}

impl PricePath {
    /// Build a path starting at `start`. Requires `0 < sell <= buy`, both finite.
    pub fn new(start: Quote, schedule: Schedule, rng: SimRng) -> Result<Self, SimError> {
        let valid = start.buy.is_finite()
            && start.sell.is_finite()
            && start.sell > 0.0
            && start.sell <= start.buy;
        if !valid {
            return Err(SimError::InvalidPrice {
                buy: start.buy,
                sell: start.sell,
            });
        }

        let mut series = PriceSeries::with_capacity(schedule.total_days() + 1);
        series.push(start);
        Ok(Self {
            series,
            schedule,
            rng,
            cursor: Cursor::new(),
        })
    }

    pub fn total_days(&self) -> usize {
        self.schedule.total_days()
    }

    /// Length of the finished series (`total_days + 1`).
    pub fn final_len(&self) -> usize {
        self.total_days() + 1
    }

    /// Number of quotes generated so far.
    pub fn generated(&self) -> usize {
        self.series.len()
    }

    pub fn is_complete(&self) -> bool {
        self.generated() >= self.final_len()
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Quotes generated so far.
    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    /// Generate the next day's quote. Returns `None` once the path is complete.
    pub fn advance_day(&mut self) -> Option<Quote> {
        if self.is_complete() {
            return None;
        }
        let len = self.series.len();
        let day = len - 1;
        let prev = self.series.last()?;

        let next = match self.schedule.resolve(day) {
            Some(resolved) => {
                let prior_buy = day.checked_sub(1).map(|d| self.series.buy()[d]);
                let input = StepInput {
                    prev,
                    prior_buy,
                    day,
                    day_in_regime: resolved.day_in_regime,
                };
                resolved.regime.step(&input, &mut self.rng)
            }
            None => prev,
        };

        tracing::trace!(day, buy = next.buy, sell = next.sell, "advanced");
        self.series.push(next);
        Some(next)
    }

    /// Generate until at least `len` quotes exist (capped at the final length).
    pub fn ensure_generated(&mut self, len: usize) {
        let target = len.min(self.final_len());
        while self.series.len() < target {
            if self.advance_day().is_none() {
                break;
            }
        }
    }

    /// Generate the remainder and return the finished series.
    pub fn complete(&mut self) -> &PriceSeries {
        self.ensure_generated(self.final_len());
        &self.series
    }

    pub fn prices(
        &mut self,
        side: Side,
        range: impl RangeBounds<usize>,
    ) -> Result<Vec<f64>, SimError> {
        let range = resolve_range(range, self.final_len())?;
        self.ensure_generated(range.end);
        Ok(self.series.side(side)[range].to_vec())
    }

    pub fn buy_prices(&mut self, range: impl RangeBounds<usize>) -> Result<Vec<f64>, SimError> {
        self.prices(Side::Buy, range)
    }

    pub fn sell_prices(&mut self, range: impl RangeBounds<usize>) -> Result<Vec<f64>, SimError> {
        self.prices(Side::Sell, range)
    }

    /// Read the cursor day's price for `side`. `None` past the last day.
    pub fn next_price(&mut self, side: Side) -> Option<f64> {
        let day = self.cursor.day();
        if day >= self.final_len() {
            return None;
        }
        self.ensure_generated(day + 1);
        let price = self.series.quote(day)?.get(side);
        self.cursor.take(side);
        Some(price)
    }

    /// Read the cursor day's whole quote and move to the next day.
    ///
    /// A day with one side already read is completed, not skipped.
    pub fn next_quote(&mut self) -> Option<Quote> {
        let day = self.cursor.day();
        if day >= self.final_len() {
            return None;
        }
        self.ensure_generated(day + 1);
        let quote = self.series.quote(day)?;
        self.cursor.finish_day();
        Some(quote)
    }

    pub fn next_buy_price(&mut self) -> Option<f64> {
        self.next_price(Side::Buy)
    }

    pub fn next_sell_price(&mut self) -> Option<f64> {
        self.next_price(Side::Sell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regime::Regime;
    use crate::schedule::RegimeAssignment;

    fn gbm_path(days: usize, seed: u64) -> PricePath {
        let schedule = Schedule::new(vec![RegimeAssignment::new(
            Regime::gbm(0.0005, 0.02).unwrap(),
            0,
            days,
        )])
        .unwrap();
        PricePath::new(Quote::new(100.0, 99.0), schedule, SimRng::seeded(seed)).unwrap()
    }

    #[test]
    fn starts_with_only_day_zero() {
        let p = gbm_path(10, 1);
        assert_eq!(p.generated(), 1);
        assert_eq!(p.series().quote(0), Some(Quote::new(100.0, 99.0)));
    }

    #[test]
    fn generation_is_lazy() {
        let mut p = gbm_path(100, 1);
        let head = p.buy_prices(0..5).unwrap();
        assert_eq!(head.len(), 5);
        assert_eq!(p.generated(), 5);
        assert!(!p.is_complete());
    }

    #[test]
    fn full_series_has_total_days_plus_one() {
        let mut p = gbm_path(42, 1);
        assert_eq!(p.total_days(), 42);
        assert_eq!(p.buy_prices(..).unwrap().len(), 43);
        assert!(p.is_complete());
        assert_eq!(p.advance_day(), None);
    }

    #[test]
    fn batch_reads_are_independent_of_chunking() {
        let mut a = gbm_path(50, 7);
        let mut b = gbm_path(50, 7);
        let whole = a.buy_prices(..).unwrap();
        let mut pieces = b.buy_prices(0..10).unwrap();
        pieces.extend(b.buy_prices(10..30).unwrap());
        pieces.extend(b.buy_prices(30..).unwrap());
        assert_eq!(whole, pieces);
    }

    #[test]
    fn uncovered_days_hold_previous_quote() {
        let schedule = Schedule::new(vec![
            RegimeAssignment::new(Regime::spike(0.05).unwrap(), 0, 3),
            RegimeAssignment::new(Regime::spike(0.05).unwrap(), 6, 8),
        ])
        .unwrap();
        let mut p = PricePath::new(Quote::new(100.0, 99.0), schedule, SimRng::seeded(3)).unwrap();
        let buy = p.buy_prices(..).unwrap();
        let sell = p.sell_prices(..).unwrap();
        assert_eq!(buy.len(), 9);
        // days 3, 4, 5 are uncovered: indices 4, 5, 6 repeat index 3
        for i in 4..=6 {
            assert_eq!(buy[i], buy[3]);
            assert_eq!(sell[i], sell[3]);
        }
        assert_ne!(buy[7], buy[6]);
    }

    #[test]
    fn rejects_bad_start_prices() {
        let schedule = || Schedule::new(vec![]).unwrap();
        let rng = || SimRng::seeded(1);
        let bad = [
            (0.0, 0.0),
            (100.0, 0.0),
            (99.0, 100.0),
            (-1.0, -2.0),
            (f64::NAN, 1.0),
        ];
        for (buy, sell) in bad {
            let err = PricePath::new(Quote::new(buy, sell), schedule(), rng()).unwrap_err();
            assert!(matches!(err, SimError::InvalidPrice { .. }));
        }
        assert!(PricePath::new(Quote::new(100.0, 100.0), schedule(), rng()).is_ok());
    }

    #[test]
    fn cursor_matches_batch() {
        let mut batch = gbm_path(20, 9);
        let mut inc = gbm_path(20, 9);
        let buy = batch.buy_prices(..).unwrap();
        let sell = batch.sell_prices(..).unwrap();
        for d in 0..=20 {
            assert_eq!(inc.next_buy_price(), Some(buy[d]));
            assert_eq!(inc.next_sell_price(), Some(sell[d]));
        }
        assert_eq!(inc.next_buy_price(), None);
        assert_eq!(inc.next_sell_price(), None);
    }

    #[test]
    fn first_pair_is_start_quote() {
        let mut p = gbm_path(5, 2);
        assert_eq!(p.next_buy_price(), Some(100.0));
        assert_eq!(p.next_buy_price(), Some(100.0));
        assert_eq!(p.next_sell_price(), Some(99.0));
        assert_ne!(p.next_buy_price(), Some(100.0));
    }

    #[test]
    fn empty_schedule_yields_start_quote_only() {
        let mut p = PricePath::new(
            Quote::new(10.0, 9.0),
            Schedule::new(vec![]).unwrap(),
            SimRng::seeded(1),
        )
        .unwrap();
        assert_eq!(p.buy_prices(..).unwrap(), vec![10.0]);
        assert_eq!(p.next_sell_price(), Some(9.0));
        assert_eq!(p.next_buy_price(), Some(10.0));
        assert_eq!(p.next_buy_price(), None);
    }

    #[test]
    fn next_quote_walks_whole_days() {
        let mut batch = gbm_path(20, 8);
        let buy = batch.buy_prices(..).unwrap();
        let sell = batch.sell_prices(..).unwrap();

        let mut inc = gbm_path(20, 8);
        assert_eq!(inc.next_quote(), Some(Quote::new(buy[0], sell[0])));
        // half-read day 1 is completed by next_quote
        assert_eq!(inc.next_sell_price(), Some(sell[1]));
        assert_eq!(inc.next_quote(), Some(Quote::new(buy[1], sell[1])));
        for d in 2..=20 {
            assert_eq!(inc.next_quote(), Some(Quote::new(buy[d], sell[d])));
        }
        assert_eq!(inc.next_quote(), None);
        assert_eq!(inc.next_buy_price(), None);
    }
}
