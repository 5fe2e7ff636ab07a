//! PriceLab Core — regime-driven synthetic bid/ask price paths and cached indicators.
//!
//! This crate contains:
//! - Regimes: parameterized single-day quote transitions (GBM, mean reversion,
//!   jumps, scripted events)
//! - A schedule binding regimes to day ranges, later entries overriding earlier ones
//! - A lazy price-path engine with batch range reads and a two-phase incremental cursor
//! - Indicators (SMA, EMA, RSI, MACD, Bollinger, ATR) memoized per side and parameter set
//! - `MarketData`, a `Send + Sync` facade over all of the above
//! - TOML scenario files
//!
//! Generation is deterministic for a given seed: the path owns its RNG and
//! draws from it strictly in day order.

pub mod config;
pub mod error;
pub mod indicators;
pub mod market;
pub mod path;
pub mod quote;
pub mod regime;
pub mod rng;
pub mod schedule;

pub use config::{ConfigError, IndicatorSelection, RegimeConfig, RegimeEntry, Scenario};
pub use error::{RegimeError, SimError};
pub use indicators::{BollingerSeries, MacdSeries};
pub use market::{
    BollingerParams, MacdParams, MarketData, DEFAULT_ATR_PERIOD, DEFAULT_EMA_PERIOD,
    DEFAULT_RSI_PERIOD, DEFAULT_SMA_PERIOD,
};
pub use quote::{Quote, Side};
pub use regime::Regime;
pub use schedule::{RegimeAssignment, Schedule};
