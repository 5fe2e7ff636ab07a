//! Memoizing indicator engine.
//!
//! Each `(source, kind, parameters)` key is computed at most once over the
//! full series. The map lock is held only long enough to fetch or insert the
//! key's cell; the computation itself runs inside the cell's `OnceLock`, so a
//! second caller asking for an in-flight key blocks on that cell instead of
//! recomputing, while other keys proceed in parallel.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use super::{
    atr, bollinger, check_period, macd, BollingerSeries, Ema, Indicator, MacdSeries, Rsi, Sma,
};
use crate::error::SimError;
use crate::path::PriceSeries;
use crate::quote::Side;

/// Price input an indicator is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Buy,
    Sell,
    /// Both sides together (ATR).
    Both,
}

impl From<Side> for Source {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => Source::Buy,
            Side::Sell => Source::Sell,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Sma {
        period: usize,
    },
    Ema {
        period: usize,
    },
    Rsi {
        period: usize,
    },
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    /// `k_bits` is the multiplier's bit pattern so the key stays `Eq + Hash`.
    Bollinger {
        period: usize,
        k_bits: u64,
    },
    Atr {
        period: usize,
    },
}

impl IndicatorKind {
    pub fn bollinger(period: usize, k: f64) -> Self {
        IndicatorKind::Bollinger {
            period,
            k_bits: k.to_bits(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IndicatorKind::Sma { .. } => "sma",
            IndicatorKind::Ema { .. } => "ema",
            IndicatorKind::Rsi { .. } => "rsi",
            IndicatorKind::Macd { .. } => "macd",
            IndicatorKind::Bollinger { .. } => "bollinger",
            IndicatorKind::Atr { .. } => "atr",
        }
    }

    /// The single-series indicator behind a line kind; `None` for the
    /// multi-line kinds and for ATR, which reads both sides.
    pub fn line_indicator(&self) -> Result<Option<Box<dyn Indicator>>, SimError> {
        match Computation::for_kind(*self)? {
            Computation::Line(indicator) => Ok(Some(indicator)),
            _ => Ok(None),
        }
    }

    fn validate(&self) -> Result<(), SimError> {
        let name = self.name();
        match *self {
            IndicatorKind::Sma { period }
            | IndicatorKind::Ema { period }
            | IndicatorKind::Rsi { period }
            | IndicatorKind::Atr { period } => check_period(name, period),
            IndicatorKind::Macd { fast, slow, signal } => {
                check_period(name, fast)?;
                check_period(name, slow)?;
                check_period(name, signal)
            }
            IndicatorKind::Bollinger { period, k_bits } => {
                check_period(name, period)?;
                let k = f64::from_bits(k_bits);
                if k.is_finite() && k >= 0.0 {
                    Ok(())
                } else {
                    Err(SimError::InvalidParameter {
                        indicator: name,
                        reason: format!("multiplier must be finite and >= 0 (got {k})"),
                    })
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndicatorKey {
    pub source: Source,
    pub kind: IndicatorKind,
}

impl IndicatorKey {
    pub fn new(source: impl Into<Source>, kind: IndicatorKind) -> Self {
        Self {
            source: source.into(),
            kind,
        }
    }

    /// ATR keys read both sides; every other kind reads exactly one.
    fn validate(&self) -> Result<(), SimError> {
        self.kind.validate()?;
        let needs_both = matches!(self.kind, IndicatorKind::Atr { .. });
        if needs_both != (self.source == Source::Both) {
            return Err(SimError::InvalidParameter {
                indicator: self.kind.name(),
                reason: format!("cannot be computed over source {:?}", self.source),
            });
        }
        Ok(())
    }
}

/// A cached full-length indicator result.
#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorOutput {
    Line(Vec<f64>),
    Macd(MacdSeries),
    Bollinger(BollingerSeries),
}

impl IndicatorOutput {
    pub fn len(&self) -> usize {
        match self {
            IndicatorOutput::Line(v) => v.len(),
            IndicatorOutput::Macd(m) => m.len(),
            IndicatorOutput::Bollinger(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_line(&self) -> Option<&[f64]> {
        match self {
            IndicatorOutput::Line(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_macd(&self) -> Option<&MacdSeries> {
        match self {
            IndicatorOutput::Macd(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_bollinger(&self) -> Option<&BollingerSeries> {
        match self {
            IndicatorOutput::Bollinger(b) => Some(b),
            _ => None,
        }
    }
}

type Cell = Arc<OnceLock<Arc<IndicatorOutput>>>;

#[derive(Debug, Default)]
pub struct IndicatorEngine {
    cells: Mutex<HashMap<IndicatorKey, Cell>>,
}

impl IndicatorEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the full-length output for `key`, computing it over `series` on first use.
    ///
    /// `series` must be the same finished series on every call.
    pub fn get(
        &self,
        key: IndicatorKey,
        series: &PriceSeries,
    ) -> Result<Arc<IndicatorOutput>, SimError> {
        key.validate()?;
        let computation = Computation::for_kind(key.kind)?;

        let cell = Arc::clone(self.cells.lock().entry(key).or_default());
        let output = cell.get_or_init(|| {
            tracing::debug!(?key, len = series.len(), "computing indicator");
            Arc::new(computation.run(key.source, series))
        });
        Ok(Arc::clone(output))
    }

    /// Number of keys whose output has been computed.
    pub fn cached_len(&self) -> usize {
        self.cells
            .lock()
            .values()
            .filter(|cell| cell.get().is_some())
            .count()
    }
}

/// A validated key, resolved to the work it stands for.
enum Computation {
    Line(Box<dyn Indicator>),
    Macd { fast: usize, slow: usize, signal: usize },
    Bollinger { period: usize, k: f64 },
    Atr { period: usize },
}

impl Computation {
    fn for_kind(kind: IndicatorKind) -> Result<Self, SimError> {
        Ok(match kind {
            IndicatorKind::Sma { period } => Computation::Line(Box::new(Sma::new(period)?)),
            IndicatorKind::Ema { period } => Computation::Line(Box::new(Ema::new(period)?)),
            IndicatorKind::Rsi { period } => Computation::Line(Box::new(Rsi::new(period)?)),
            IndicatorKind::Macd { fast, slow, signal } => Computation::Macd { fast, slow, signal },
            IndicatorKind::Bollinger { period, k_bits } => Computation::Bollinger {
                period,
                k: f64::from_bits(k_bits),
            },
            IndicatorKind::Atr { period } => Computation::Atr { period },
        })
    }

    fn run(&self, source: Source, series: &PriceSeries) -> IndicatorOutput {
        let prices = match source {
            Source::Buy | Source::Both => series.buy(),
            Source::Sell => series.sell(),
        };
        match *self {
            Computation::Line(ref indicator) => IndicatorOutput::Line(indicator.compute(prices)),
            Computation::Macd { fast, slow, signal } => {
                IndicatorOutput::Macd(macd(prices, fast, slow, signal))
            }
            Computation::Bollinger { period, k } => {
                IndicatorOutput::Bollinger(bollinger(prices, period, k))
            }
            Computation::Atr { period } => {
                IndicatorOutput::Line(atr(series.buy(), series.sell(), period))
            }
        }
    }
}
