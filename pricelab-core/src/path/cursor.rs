//! Two-phase incremental cursor.
//!
//! A day is only left behind once both its buy and sell prices have been
//! read. Reading the same side again before the other returns the same day.

use crate::quote::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Neither side of the current day has been read.
    Fresh,
    BuyTaken,
    SellTaken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    day: usize,
    state: CursorState,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

impl Cursor {
    pub fn new() -> Self {
        Self {
            day: 0,
            state: CursorState::Fresh,
        }
    }

    pub fn day(&self) -> usize {
        self.day
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Record a read of `side` and return the day it refers to.
    ///
    /// Whichever side completes the pair moves the cursor to the next day.
    pub fn take(&mut self, side: Side) -> usize {
        let day = self.day;
        self.state = match (self.state, side) {
            (CursorState::Fresh, Side::Buy) => CursorState::BuyTaken,
            (CursorState::Fresh, Side::Sell) => CursorState::SellTaken,
            (CursorState::BuyTaken, Side::Buy) => CursorState::BuyTaken,
            (CursorState::SellTaken, Side::Sell) => CursorState::SellTaken,
            (CursorState::BuyTaken, Side::Sell) | (CursorState::SellTaken, Side::Buy) => {
                self.day += 1;
                CursorState::Fresh
            }
        };
        day
    }

    /// Leave the current day regardless of which sides were read.
    pub fn finish_day(&mut self) -> usize {
        let day = self.day;
        self.day += 1;
        self.state = CursorState::Fresh;
        day
    }
}
