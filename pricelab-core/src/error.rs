//! Error types for price-path construction and indicator queries.
//!
//! Every failure is a caller contract violation: generation and indicator
//! computation are pure and deterministic, so nothing here is retryable.

use thiserror::Error;

/// Invalid regime parameters, reported at regime construction.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid {regime} parameters: {reason}")]
pub struct RegimeError {
    pub regime: &'static str,
    pub reason: String,
}

impl RegimeError {
    pub(crate) fn new(regime: &'static str, reason: impl Into<String>) -> Self {
        Self {
            regime,
            reason: reason.into(),
        }
    }
}

/// Errors from building a market or querying its series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("invalid range: start {start} > end {end}")]
    InvalidRange { start: usize, end: usize },

    #[error("invalid start prices: buy={buy}, sell={sell} (need 0 < sell <= buy)")]
    InvalidPrice { buy: f64, sell: f64 },

    #[error("regime assignment {index} has start day {start} > end day {end}")]
    InvalidAssignment {
        index: usize,
        start: usize,
        end: usize,
    },

    #[error(transparent)]
    InvalidRegime(#[from] RegimeError),

    #[error("{indicator} period must be >= 1 (got {period})")]
    InvalidPeriod {
        indicator: &'static str,
        period: usize,
    },

    #[error("invalid {indicator} parameter: {reason}")]
    InvalidParameter {
        indicator: &'static str,
        reason: String,
    },
}
