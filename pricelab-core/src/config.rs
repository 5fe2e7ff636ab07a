//! Scenario files: start quote, seed, regime schedule and indicator selection in TOML.
//!
//! ```toml
//! start_buy = 100.0
//! start_sell = 99.0
//! seed = 42
//!
//! [[regimes]]
//! type = "gbm"
//! sigma = 0.03
//! start_day = 0
//! end_day = 100
//!
//! [indicators]
//! sma = [20, 50]
//! macd = true
//! ```
//!
//! Every regime parameter is optional and falls back to that regime's default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{RegimeError, SimError};
use crate::market::{BollingerParams, MacdParams, MarketData, DEFAULT_ATR_PERIOD};
use crate::regime::pattern::{DEFAULT_PHASE_DAYS, DEFAULT_PHASE_NOISE, DEFAULT_PHASE_RATES};
use crate::regime::{
    DropParams, EarningsParams, GbmParams, JumpDiffusionParams, MeanReversionParams,
    MomentumParams, RandomWalkParams, Regime, SineWaveParams, SpikeParams,
    TrendingMeanReversionParams,
};
use crate::schedule::RegimeAssignment;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid scenario: {0}")]
    Invalid(#[from] SimError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub start_buy: f64,
    pub start_sell: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub regimes: Vec<RegimeEntry>,
    #[serde(default)]
    pub indicators: IndicatorSelection,
}

/// One `[[regimes]]` table: a tagged regime plus its day range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeEntry {
    #[serde(flatten)]
    pub regime: RegimeConfig,
    pub start_day: usize,
    pub end_day: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegimeConfig {
    Gbm {
        mu: Option<f64>,
        sigma: Option<f64>,
    },
    MeanReversion {
        mu: Option<f64>,
        theta: Option<f64>,
        sigma: Option<f64>,
    },
    TrendingMeanReversion {
        mu: Option<f64>,
        drift: Option<f64>,
        theta: Option<f64>,
        sigma: Option<f64>,
    },
    Momentum {
        mu: Option<f64>,
        sigma: Option<f64>,
        momentum: Option<f64>,
    },
    RandomWalk {
        volatility: Option<f64>,
    },
    SineWave {
        volatility: Option<f64>,
        amplitude: Option<f64>,
        phase: Option<f64>,
    },
    JumpDiffusion {
        mu: Option<f64>,
        sigma: Option<f64>,
        jump_intensity: Option<f64>,
        jump_size: Option<f64>,
    },
    Drop {
        rate: Option<f64>,
    },
    Spike {
        rate: Option<f64>,
    },
    Earnings {
        target_min: Option<f64>,
        target_max: Option<f64>,
        num_days: Option<usize>,
        noise: Option<f64>,
    },
    DeadCatBounce {
        drop_rate: Option<f64>,
        recovery_rate: Option<f64>,
        decline_rate: Option<f64>,
        num_days: Option<usize>,
        noise: Option<f64>,
    },
    InverseDeadCatBounce {
        rise_rate: Option<f64>,
        pullback_rate: Option<f64>,
        continue_rate: Option<f64>,
        num_days: Option<usize>,
        noise: Option<f64>,
    },
}

impl RegimeConfig {
    /// Validate and build the regime, filling omitted parameters with defaults.
    pub fn build(&self) -> Result<Regime, RegimeError> {
        match *self {
            RegimeConfig::Gbm { mu, sigma } => {
                let d = GbmParams::default();
                Regime::gbm(mu.unwrap_or(d.mu), sigma.unwrap_or(d.sigma))
            }
            RegimeConfig::MeanReversion { mu, theta, sigma } => {
                let d = MeanReversionParams::default();
                Regime::mean_reversion(
                    mu.unwrap_or(d.mu),
                    theta.unwrap_or(d.theta),
                    sigma.unwrap_or(d.sigma),
                )
            }
            RegimeConfig::TrendingMeanReversion {
                mu,
                drift,
                theta,
                sigma,
            } => {
                let d = TrendingMeanReversionParams::default();
                Regime::trending_mean_reversion(
                    mu.unwrap_or(d.mu),
                    drift.unwrap_or(d.drift),
                    theta.unwrap_or(d.theta),
                    sigma.unwrap_or(d.sigma),
                )
            }
            RegimeConfig::Momentum {
                mu,
                sigma,
                momentum,
            } => {
                let d = MomentumParams::default();
                Regime::momentum(
                    mu.unwrap_or(d.mu),
                    sigma.unwrap_or(d.sigma),
                    momentum.unwrap_or(d.momentum),
                )
            }
            RegimeConfig::RandomWalk { volatility } => {
                Regime::random_walk(volatility.unwrap_or(RandomWalkParams::default().volatility))
            }
            RegimeConfig::SineWave {
                volatility,
                amplitude,
                phase,
            } => {
                let d = SineWaveParams::default();
                Regime::sine_wave(
                    volatility.unwrap_or(d.volatility),
                    amplitude.unwrap_or(d.amplitude),
                    phase.unwrap_or(d.phase),
                )
            }
            RegimeConfig::JumpDiffusion {
                mu,
                sigma,
                jump_intensity,
                jump_size,
            } => {
                let d = JumpDiffusionParams::default();
                Regime::jump_diffusion(
                    mu.unwrap_or(d.mu),
                    sigma.unwrap_or(d.sigma),
                    jump_intensity.unwrap_or(d.jump_intensity),
                    jump_size.unwrap_or(d.jump_size),
                )
            }
            RegimeConfig::Drop { rate } => Regime::drop(rate.unwrap_or(DropParams::default().rate)),
            RegimeConfig::Spike { rate } => {
                Regime::spike(rate.unwrap_or(SpikeParams::default().rate))
            }
            RegimeConfig::Earnings {
                target_min,
                target_max,
                num_days,
                noise,
            } => {
                let d = EarningsParams::default();
                Regime::earnings(
                    target_min.unwrap_or(d.target_min),
                    target_max.unwrap_or(d.target_max),
                    num_days.unwrap_or(d.num_days),
                    noise.unwrap_or(d.noise),
                )
            }
            RegimeConfig::DeadCatBounce {
                drop_rate,
                recovery_rate,
                decline_rate,
                num_days,
                noise,
            } => {
                let (a, b, c) = DEFAULT_PHASE_RATES;
                Regime::dead_cat_bounce(
                    drop_rate.unwrap_or(a),
                    recovery_rate.unwrap_or(b),
                    decline_rate.unwrap_or(c),
                    num_days.unwrap_or(DEFAULT_PHASE_DAYS),
                    noise.unwrap_or(DEFAULT_PHASE_NOISE),
                )
            }
            RegimeConfig::InverseDeadCatBounce {
                rise_rate,
                pullback_rate,
                continue_rate,
                num_days,
                noise,
            } => {
                let (a, b, c) = DEFAULT_PHASE_RATES;
                Regime::inverse_dead_cat_bounce(
                    rise_rate.unwrap_or(a),
                    pullback_rate.unwrap_or(b),
                    continue_rate.unwrap_or(c),
                    num_days.unwrap_or(DEFAULT_PHASE_DAYS),
                    noise.unwrap_or(DEFAULT_PHASE_NOISE),
                )
            }
        }
    }
}

/// Which indicator columns to export alongside prices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSelection {
    pub sma: Vec<usize>,
    pub ema: Vec<usize>,
    pub rsi: Vec<usize>,
    pub macd: bool,
    pub bollinger: bool,
    pub atr: bool,
    pub macd_params: MacdParams,
    pub bollinger_params: BollingerParams,
    pub atr_period: Option<usize>,
}

impl IndicatorSelection {
    pub fn atr_period(&self) -> usize {
        self.atr_period.unwrap_or(DEFAULT_ATR_PERIOD)
    }

    pub fn is_empty(&self) -> bool {
        self.sma.is_empty()
            && self.ema.is_empty()
            && self.rsi.is_empty()
            && !self.macd
            && !self.bollinger
            && !self.atr
    }
}

impl Scenario {
    /// Load a scenario from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a scenario from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn assignments(&self) -> Result<Vec<RegimeAssignment>, SimError> {
        self.regimes
            .iter()
            .map(|entry| -> Result<RegimeAssignment, SimError> {
                let regime = entry.regime.build()?;
                Ok(RegimeAssignment::new(regime, entry.start_day, entry.end_day))
            })
            .collect()
    }

    /// Build a market using the scenario's own seed.
    pub fn build(&self) -> Result<MarketData, ConfigError> {
        self.build_with_seed(self.seed)
    }

    /// Build a market, overriding the scenario's seed.
    pub fn build_with_seed(&self, seed: Option<u64>) -> Result<MarketData, ConfigError> {
        let market = MarketData::new(self.start_buy, self.start_sell, self.assignments()?, seed)?;
        Ok(market)
    }
}
