//! Two-sided daily quote and side selector.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One day's buy (ask) and sell (bid) price. Always `buy >= sell > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub buy: f64,
    pub sell: f64,
}

impl Quote {
    pub fn new(buy: f64, sell: f64) -> Self {
        Self { buy, sell }
    }

    pub fn spread(&self) -> f64 {
        self.buy - self.sell
    }

    pub fn mid(&self) -> f64 {
        0.5 * (self.buy + self.sell)
    }

    pub fn get(&self, side: Side) -> f64 {
        match side {
            Side::Buy => self.buy,
            Side::Sell => self.sell,
        }
    }
}

/// Which side of the quote a series or indicator refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.pad("buy"),
            Side::Sell => f.pad("sell"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spread_and_mid() {
        let q = Quote::new(100.0, 99.0);
        assert_eq!(q.spread(), 1.0);
        assert_eq!(q.mid(), 99.5);
        assert_eq!(q.get(Side::Buy), 100.0);
        assert_eq!(q.get(Side::Sell), 99.0);
    }

    #[test]
    fn side_display() {
        assert_eq!(Side::Buy.to_string(), "buy");
        assert_eq!(Side::Sell.to_string(), "sell");
    }
}
