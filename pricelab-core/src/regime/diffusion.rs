//! Multiplicative diffusion regimes: GBM, jump diffusion, random walk, momentum.

use super::{finite, in_closed_range, in_range, non_negative, StepInput, MIN_FACTOR};
use crate::error::RegimeError;
use crate::rng::SimRng;

/// One log-normal step with unit time increment.
fn gbm_step(price: f64, mu: f64, sigma: f64, z: f64) -> f64 {
    price * ((mu - 0.5 * sigma * sigma) + sigma * z).exp()
}

/// Geometric Brownian motion: `next = prev * exp((mu - sigma^2/2) + sigma * Z)`.
#[derive(Debug, Clone, PartialEq)]
pub struct GbmParams {
    pub(crate) mu: f64,
    pub(crate) sigma: f64,
}

impl GbmParams {
    pub fn new(mu: f64, sigma: f64) -> Result<Self, RegimeError> {
        finite("gbm", "mu", mu)?;
        non_negative("gbm", "sigma", sigma)?;
        Ok(Self { mu, sigma })
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub(crate) fn next_buy(&self, input: &StepInput, rng: &mut SimRng) -> f64 {
        gbm_step(input.prev.buy, self.mu, self.sigma, rng.next_normal())
    }
}

impl Default for GbmParams {
    fn default() -> Self {
        Self {
            mu: 0.0005,
            sigma: 0.02,
        }
    }
}

/// GBM plus Bernoulli-triggered jumps.
///
/// With probability `jump_intensity` per day the GBM result is multiplied by
/// `1 + J`, `J ~ N(jump_size, |jump_size|)`.
#[derive(Debug, Clone, PartialEq)]
pub struct JumpDiffusionParams {
    pub(crate) mu: f64,
    pub(crate) sigma: f64,
    pub(crate) jump_intensity: f64,
    pub(crate) jump_size: f64,
}

impl JumpDiffusionParams {
    pub fn new(
        mu: f64,
        sigma: f64,
        jump_intensity: f64,
        jump_size: f64,
    ) -> Result<Self, RegimeError> {
        finite("jump_diffusion", "mu", mu)?;
        non_negative("jump_diffusion", "sigma", sigma)?;
        in_closed_range("jump_diffusion", "jump_intensity", jump_intensity, 0.0, 1.0)?;
        finite("jump_diffusion", "jump_size", jump_size)?;
        Ok(Self {
            mu,
            sigma,
            jump_intensity,
            jump_size,
        })
    }

    pub(crate) fn next_buy(&self, input: &StepInput, rng: &mut SimRng) -> f64 {
        let diffused = gbm_step(input.prev.buy, self.mu, self.sigma, rng.next_normal());
        if rng.next_uniform() < self.jump_intensity {
            let jump = self.jump_size + self.jump_size.abs() * rng.next_normal();
            diffused * (1.0 + jump).max(MIN_FACTOR)
        } else {
            diffused
        }
    }
}

impl Default for JumpDiffusionParams {
    fn default() -> Self {
        Self {
            mu: 0.0,
            sigma: 0.02,
            jump_intensity: 0.1,
            jump_size: 0.05,
        }
    }
}

/// Arithmetic-return random walk: `next = prev * (1 + volatility * Z)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomWalkParams {
    pub(crate) volatility: f64,
}

impl RandomWalkParams {
    pub fn new(volatility: f64) -> Result<Self, RegimeError> {
        non_negative("random_walk", "volatility", volatility)?;
        Ok(Self { volatility })
    }

    pub(crate) fn next_buy(&self, input: &StepInput, rng: &mut SimRng) -> f64 {
        let factor = 1.0 + self.volatility * rng.next_normal();
        input.prev.buy * factor.max(MIN_FACTOR)
    }
}

impl Default for RandomWalkParams {
    fn default() -> Self {
        Self { volatility: 0.01 }
    }
}

/// Trend continuation: today's log return carries `momentum` times
/// yesterday's realized log return, plus drift and a Gaussian shock.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentumParams {
    pub(crate) mu: f64,
    pub(crate) sigma: f64,
    pub(crate) momentum: f64,
}

impl MomentumParams {
    pub fn new(mu: f64, sigma: f64, momentum: f64) -> Result<Self, RegimeError> {
        finite("momentum", "mu", mu)?;
        non_negative("momentum", "sigma", sigma)?;
        in_range("momentum", "momentum", momentum, 0.0, 1.0)?;
        Ok(Self {
            mu,
            sigma,
            momentum,
        })
    }

    pub(crate) fn next_buy(&self, input: &StepInput, rng: &mut SimRng) -> f64 {
        let realized = match input.prior_buy {
            Some(prior) if prior > 0.0 => (input.prev.buy / prior).ln(),
            _ => 0.0,
        };
        let log_return = self.mu + self.momentum * realized + self.sigma * rng.next_normal();
        input.prev.buy * log_return.exp()
    }
}

impl Default for MomentumParams {
    fn default() -> Self {
        Self {
            mu: 0.0,
            sigma: 0.02,
            momentum: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::Quote;

    fn at(buy: f64, prior_buy: Option<f64>) -> StepInput {
        StepInput {
            prev: Quote::new(buy, buy - 1.0),
            prior_buy,
            day: 0,
            day_in_regime: 0,
        }
    }

    #[test]
    fn gbm_defaults() {
        let p = GbmParams::default();
        assert_eq!(p.mu(), 0.0005);
        assert_eq!(p.sigma(), 0.02);
    }

    #[test]
    fn gbm_matches_closed_form() {
        let p = GbmParams::new(0.001, 0.02).unwrap();
        let mut rng = SimRng::seeded(9);
        let mut replay = SimRng::seeded(9);
        let z = replay.next_normal();
        let expected = 100.0 * ((0.001 - 0.5 * 0.02 * 0.02) + 0.02 * z).exp();
        assert_eq!(p.next_buy(&at(100.0, None), &mut rng), expected);
    }

    #[test]
    fn jump_diffusion_certain_jump_moves_price() {
        let p = JumpDiffusionParams::new(0.0, 0.0, 1.0, -0.1).unwrap();
        let mut rng = SimRng::seeded(3);
        let next = p.next_buy(&at(100.0, None), &mut rng);
        // sigma = 0 leaves only the jump: 100 * (1 + J), J ~ N(-0.1, 0.1)
        assert_ne!(next, 100.0);
        assert!(next > 0.0);
    }

    #[test]
    fn jump_diffusion_zero_intensity_is_gbm() {
        let jd = JumpDiffusionParams::new(0.0, 0.02, 0.0, 0.5).unwrap();
        let gbm = GbmParams::new(0.0, 0.02).unwrap();
        let mut a = SimRng::seeded(11);
        let mut b = SimRng::seeded(11);
        assert_eq!(
            jd.next_buy(&at(100.0, None), &mut a),
            gbm.next_buy(&at(100.0, None), &mut b)
        );
    }

    #[test]
    fn random_walk_zero_volatility_is_flat() {
        let p = RandomWalkParams::new(0.0).unwrap();
        let mut rng = SimRng::seeded(1);
        assert_eq!(p.next_buy(&at(100.0, None), &mut rng), 100.0);
    }

    #[test]
    fn momentum_continues_prior_return() {
        // No noise: next log return = momentum * ln(110/100).
        let p = MomentumParams::new(0.0, 0.0, 0.5).unwrap();
        let mut rng = SimRng::seeded(1);
        let next = p.next_buy(&at(110.0, Some(100.0)), &mut rng);
        let expected = 110.0 * (0.5 * (110.0_f64 / 100.0).ln()).exp();
        assert!((next - expected).abs() < 1e-9);
        assert!(next > 110.0);
    }

    #[test]
    fn momentum_without_history_is_drift_only() {
        let p = MomentumParams::new(0.01, 0.0, 0.9).unwrap();
        let mut rng = SimRng::seeded(1);
        let next = p.next_buy(&at(100.0, None), &mut rng);
        assert!((next - 100.0 * 0.01_f64.exp()).abs() < 1e-9);
    }

    #[test]
    fn momentum_rejects_explosive_coefficient() {
        assert!(MomentumParams::new(0.0, 0.02, 1.0).is_err());
        assert!(MomentumParams::new(0.0, 0.02, -0.1).is_err());
    }
}
