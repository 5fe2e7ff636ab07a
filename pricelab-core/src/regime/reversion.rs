//! Mean-reverting regimes (discrete Ornstein-Uhlenbeck).

use super::{finite, non_negative, positive, StepInput};
use crate::error::RegimeError;
use crate::rng::SimRng;

/// `next = prev + theta * (mu - prev) + sigma * Z`.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanReversionParams {
    pub(crate) mu: f64,
    pub(crate) theta: f64,
    pub(crate) sigma: f64,
}

impl MeanReversionParams {
    pub fn new(mu: f64, theta: f64, sigma: f64) -> Result<Self, RegimeError> {
        positive("mean_reversion", "mu", mu)?;
        non_negative("mean_reversion", "theta", theta)?;
        non_negative("mean_reversion", "sigma", sigma)?;
        Ok(Self { mu, theta, sigma })
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    pub(crate) fn next_buy(&self, input: &StepInput, rng: &mut SimRng) -> f64 {
        ou_step(input.prev.buy, self.mu, self.theta, self.sigma, rng.next_normal())
    }
}

impl Default for MeanReversionParams {
    fn default() -> Self {
        Self {
            mu: 100.0,
            theta: 0.1,
            sigma: 0.5,
        }
    }
}

/// Mean reversion toward a target that rises by `drift` per day in the regime.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendingMeanReversionParams {
    pub(crate) mu: f64,
    pub(crate) drift: f64,
    pub(crate) theta: f64,
    pub(crate) sigma: f64,
}

impl TrendingMeanReversionParams {
    pub fn new(mu: f64, drift: f64, theta: f64, sigma: f64) -> Result<Self, RegimeError> {
        positive("trending_mean_reversion", "mu", mu)?;
        finite("trending_mean_reversion", "drift", drift)?;
        non_negative("trending_mean_reversion", "theta", theta)?;
        non_negative("trending_mean_reversion", "sigma", sigma)?;
        Ok(Self {
            mu,
            drift,
            theta,
            sigma,
        })
    }

    /// Reversion target on the given day of the regime.
    pub fn target(&self, day_in_regime: usize) -> f64 {
        self.mu + self.drift * day_in_regime as f64
    }

    pub(crate) fn next_buy(&self, input: &StepInput, rng: &mut SimRng) -> f64 {
        let target = self.target(input.day_in_regime);
        ou_step(input.prev.buy, target, self.theta, self.sigma, rng.next_normal())
    }
}

impl Default for TrendingMeanReversionParams {
    fn default() -> Self {
        Self {
            mu: 100.0,
            drift: 0.0,
            theta: 0.1,
            sigma: 0.5,
        }
    }
}

fn ou_step(price: f64, target: f64, theta: f64, sigma: f64, z: f64) -> f64 {
    price + theta * (target - price) + sigma * z
}
