//! Append-only buy/sell price storage and range resolution.

use std::ops::{Bound, Range, RangeBounds};

use crate::error::SimError;
use crate::quote::{Quote, Side};

/// Generated quotes, one entry per day starting at day 0.
///
/// Both vectors always have the same length. Entries are never rewritten
/// once pushed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    buy: Vec<f64>,
    sell: Vec<f64>,
}

impl PriceSeries {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buy: Vec::with_capacity(capacity),
            sell: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, quote: Quote) {
        self.buy.push(quote.buy);
        self.sell.push(quote.sell);
    }

    pub fn len(&self) -> usize {
        self.buy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buy.is_empty()
    }

    pub fn quote(&self, day: usize) -> Option<Quote> {
        Some(Quote::new(*self.buy.get(day)?, *self.sell.get(day)?))
    }

    pub fn last(&self) -> Option<Quote> {
        self.len().checked_sub(1).and_then(|d| self.quote(d))
    }

    pub fn buy(&self) -> &[f64] {
        &self.buy
    }

    pub fn sell(&self) -> &[f64] {
        &self.sell
    }

    pub fn side(&self, side: Side) -> &[f64] {
        match side {
            Side::Buy => &self.buy,
            Side::Sell => &self.sell,
        }
    }
}

/// Turn `range` into concrete indices over a series of length `len`.
///
/// Omitted bounds default to `0` and `len`. `start > end` is an error; an
/// end past `len` is clamped, and so is a start that lands past the clamped end.
pub fn resolve_range(range: impl RangeBounds<usize>, len: usize) -> Result<Range<usize>, SimError> {
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => e.saturating_add(1),
        Bound::Excluded(&e) => e,
        Bound::Unbounded => len.max(start),
    };
    if start > end {
        return Err(SimError::InvalidRange { start, end });
    }
    let end = end.min(len);
    Ok(start.min(end)..end)
}
