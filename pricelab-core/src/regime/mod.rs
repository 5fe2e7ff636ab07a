//! Price regimes: parameterized rules for one day's quote transition.
//!
//! `Regime` is a closed enum. Each variant wraps a validated parameter struct
//! that computes the next buy level; [`Regime::step`] then applies the same
//! relative move to the sell side, so the spread scales with price and
//! `buy >= sell` holds on every generated day.
//!
//! Regimes hold no state between steps. Anything history-dependent (the
//! previous realized return, the elapsed days in the regime) arrives through
//! [`StepInput`].

pub mod diffusion;
pub mod pattern;
pub mod reversion;
pub mod trend;

pub use diffusion::{GbmParams, JumpDiffusionParams, MomentumParams, RandomWalkParams};
pub use pattern::{DeadCatBounceParams, EarningsParams, InverseDeadCatBounceParams};
pub use reversion::{MeanReversionParams, TrendingMeanReversionParams};
pub use trend::{DropParams, SineWaveParams, SpikeParams};

use crate::error::RegimeError;
use crate::quote::Quote;
use crate::rng::SimRng;

/// Smallest buy level a step may produce.
pub(crate) const PRICE_FLOOR: f64 = 1e-9;

/// Lower bound on multiplicative step factors (a single day can lose at most 99%).
pub(crate) const MIN_FACTOR: f64 = 0.01;

/// Everything a regime needs to produce the next quote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInput {
    /// Quote at the current day.
    pub prev: Quote,
    /// Buy price one day before `prev`, if any.
    pub prior_buy: Option<f64>,
    /// Absolute day index being stepped (0-based).
    pub day: usize,
    /// Days elapsed since the governing assignment started.
    pub day_in_regime: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Regime {
    Gbm(GbmParams),
    MeanReversion(MeanReversionParams),
    TrendingMeanReversion(TrendingMeanReversionParams),
    Momentum(MomentumParams),
    RandomWalk(RandomWalkParams),
    SineWave(SineWaveParams),
    JumpDiffusion(JumpDiffusionParams),
    Drop(DropParams),
    Spike(SpikeParams),
    Earnings(EarningsParams),
    DeadCatBounce(DeadCatBounceParams),
    InverseDeadCatBounce(InverseDeadCatBounceParams),
}

impl Regime {
    pub fn name(&self) -> &'static str {
        match self {
            Regime::Gbm(_) => "gbm",
            Regime::MeanReversion(_) => "mean_reversion",
            Regime::TrendingMeanReversion(_) => "trending_mean_reversion",
            Regime::Momentum(_) => "momentum",
            Regime::RandomWalk(_) => "random_walk",
            Regime::SineWave(_) => "sine_wave",
            Regime::JumpDiffusion(_) => "jump_diffusion",
            Regime::Drop(_) => "drop",
            Regime::Spike(_) => "spike",
            Regime::Earnings(_) => "earnings",
            Regime::DeadCatBounce(_) => "dead_cat_bounce",
            Regime::InverseDeadCatBounce(_) => "inverse_dead_cat_bounce",
        }
    }

    /// Produce the next quote from `input`, drawing from `rng`.
    pub fn step(&self, input: &StepInput, rng: &mut SimRng) -> Quote {
        let raw_buy = match self {
            Regime::Gbm(p) => p.next_buy(input, rng),
            Regime::MeanReversion(p) => p.next_buy(input, rng),
            Regime::TrendingMeanReversion(p) => p.next_buy(input, rng),
            Regime::Momentum(p) => p.next_buy(input, rng),
            Regime::RandomWalk(p) => p.next_buy(input, rng),
            Regime::SineWave(p) => p.next_buy(input, rng),
            Regime::JumpDiffusion(p) => p.next_buy(input, rng),
            Regime::Drop(p) => p.next_buy(input, rng),
            Regime::Spike(p) => p.next_buy(input, rng),
            Regime::Earnings(p) => p.next_buy(input, rng),
            Regime::DeadCatBounce(p) => p.next_buy(input, rng),
            Regime::InverseDeadCatBounce(p) => p.next_buy(input, rng),
        };
        apply_move(input.prev, raw_buy)
    }

    pub fn gbm(mu: f64, sigma: f64) -> Result<Self, RegimeError> {
        GbmParams::new(mu, sigma).map(Regime::Gbm)
    }

    pub fn mean_reversion(mu: f64, theta: f64, sigma: f64) -> Result<Self, RegimeError> {
        MeanReversionParams::new(mu, theta, sigma).map(Regime::MeanReversion)
    }

    pub fn trending_mean_reversion(
        mu: f64,
        drift: f64,
        theta: f64,
        sigma: f64,
    ) -> Result<Self, RegimeError> {
        TrendingMeanReversionParams::new(mu, drift, theta, sigma)
            .map(Regime::TrendingMeanReversion)
    }

    pub fn momentum(mu: f64, sigma: f64, momentum: f64) -> Result<Self, RegimeError> {
        MomentumParams::new(mu, sigma, momentum).map(Regime::Momentum)
    }

    pub fn random_walk(volatility: f64) -> Result<Self, RegimeError> {
        RandomWalkParams::new(volatility).map(Regime::RandomWalk)
    }

    pub fn sine_wave(volatility: f64, amplitude: f64, phase: f64) -> Result<Self, RegimeError> {
        SineWaveParams::new(volatility, amplitude, phase).map(Regime::SineWave)
    }

    pub fn jump_diffusion(
        mu: f64,
        sigma: f64,
        jump_intensity: f64,
        jump_size: f64,
    ) -> Result<Self, RegimeError> {
        JumpDiffusionParams::new(mu, sigma, jump_intensity, jump_size).map(Regime::JumpDiffusion)
    }

    pub fn drop(rate: f64) -> Result<Self, RegimeError> {
        DropParams::new(rate).map(Regime::Drop)
    }

    pub fn spike(rate: f64) -> Result<Self, RegimeError> {
        SpikeParams::new(rate).map(Regime::Spike)
    }

    pub fn earnings(
        target_min: f64,
        target_max: f64,
        num_days: usize,
        noise: f64,
    ) -> Result<Self, RegimeError> {
        EarningsParams::new(target_min, target_max, num_days, noise).map(Regime::Earnings)
    }

    pub fn dead_cat_bounce(
        drop_rate: f64,
        recovery_rate: f64,
        decline_rate: f64,
        num_days: usize,
        noise: f64,
    ) -> Result<Self, RegimeError> {
        DeadCatBounceParams::new(drop_rate, recovery_rate, decline_rate, num_days, noise)
            .map(Regime::DeadCatBounce)
    }

    pub fn inverse_dead_cat_bounce(
        rise_rate: f64,
        pullback_rate: f64,
        continue_rate: f64,
        num_days: usize,
        noise: f64,
    ) -> Result<Self, RegimeError> {
        InverseDeadCatBounceParams::new(rise_rate, pullback_rate, continue_rate, num_days, noise)
            .map(Regime::InverseDeadCatBounce)
    }
}

/// Move the quote to `raw_buy`, scaling the sell side by the same ratio.
fn apply_move(prev: Quote, raw_buy: f64) -> Quote {
    let buy = if raw_buy.is_finite() {
        raw_buy.max(PRICE_FLOOR)
    } else {
        prev.buy
    };
    let ratio = buy / prev.buy;
    let sell = (prev.sell * ratio).min(buy);
    Quote { buy, sell }
}

// ── Parameter validation ─────────────────────────────────────────────

pub(crate) fn finite(regime: &'static str, name: &str, value: f64) -> Result<(), RegimeError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RegimeError::new(regime, format!("{name} must be finite (got {value})")))
    }
}

pub(crate) fn non_negative(
    regime: &'static str,
    name: &str,
    value: f64,
) -> Result<(), RegimeError> {
    finite(regime, name, value)?;
    if value < 0.0 {
        return Err(RegimeError::new(regime, format!("{name} must be >= 0 (got {value})")));
    }
    Ok(())
}

pub(crate) fn positive(regime: &'static str, name: &str, value: f64) -> Result<(), RegimeError> {
    finite(regime, name, value)?;
    if value <= 0.0 {
        return Err(RegimeError::new(regime, format!("{name} must be > 0 (got {value})")));
    }
    Ok(())
}

/// `lo <= value < hi`.
pub(crate) fn in_range(
    regime: &'static str,
    name: &str,
    value: f64,
    lo: f64,
    hi: f64,
) -> Result<(), RegimeError> {
    finite(regime, name, value)?;
    if value < lo || value >= hi {
        return Err(RegimeError::new(
            regime,
            format!("{name} must be in [{lo}, {hi}) (got {value})"),
        ));
    }
    Ok(())
}

/// `lo <= value <= hi`.
pub(crate) fn in_closed_range(
    regime: &'static str,
    name: &str,
    value: f64,
    lo: f64,
    hi: f64,
) -> Result<(), RegimeError> {
    finite(regime, name, value)?;
    if value < lo || value > hi {
        return Err(RegimeError::new(
            regime,
            format!("{name} must be in [{lo}, {hi}] (got {value})"),
        ));
    }
    Ok(())
}
