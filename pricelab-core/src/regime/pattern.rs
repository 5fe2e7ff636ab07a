//! Scripted event regimes: earnings landings and (inverse) dead-cat bounces.
//!
//! These regimes steer the path by the day's position within the regime.
//! Drift is applied in log space, so every phase multiplier is reached in
//! expectation regardless of the starting level.

use super::{in_closed_range, in_range, non_negative, positive, StepInput};
use crate::error::RegimeError;
use crate::rng::SimRng;

/// Drive the price onto the midpoint of `[target_min, target_max]` by day `num_days`.
///
/// Each day closes `1 / remaining` of the remaining log distance to the
/// target. The final scheduled day carries no noise, so the path lands on the
/// target exactly; later days hold the level with noise only.
#[derive(Debug, Clone, PartialEq)]
pub struct EarningsParams {
    pub(crate) target_min: f64,
    pub(crate) target_max: f64,
    pub(crate) num_days: usize,
    pub(crate) noise: f64,
}

impl EarningsParams {
    pub fn new(
        target_min: f64,
        target_max: f64,
        num_days: usize,
        noise: f64,
    ) -> Result<Self, RegimeError> {
        positive("earnings", "target_min", target_min)?;
        positive("earnings", "target_max", target_max)?;
        if target_max < target_min {
            return Err(RegimeError::new(
                "earnings",
                format!("target_max ({target_max}) must be >= target_min ({target_min})"),
            ));
        }
        if num_days == 0 {
            return Err(RegimeError::new("earnings", "num_days must be >= 1"));
        }
        non_negative("earnings", "noise", noise)?;
        Ok(Self {
            target_min,
            target_max,
            num_days,
            noise,
        })
    }

    pub fn target(&self) -> f64 {
        0.5 * (self.target_min + self.target_max)
    }

    pub(crate) fn next_buy(&self, input: &StepInput, rng: &mut SimRng) -> f64 {
        let z = rng.next_normal();
        let prev = input.prev.buy;
        let day = input.day_in_regime;

        if day >= self.num_days {
            return prev * (self.noise * z).exp();
        }

        let remaining = self.num_days - day;
        let drift = (self.target() / prev).ln() / remaining as f64;
        let shock = if remaining == 1 { 0.0 } else { self.noise * z };
        prev * (drift + shock).exp()
    }
}

impl Default for EarningsParams {
    fn default() -> Self {
        Self {
            target_min: 90.0,
            target_max: 110.0,
            num_days: 5,
            noise: 0.02,
        }
    }
}

/// Default `(first, second, third)` phase rates for both bounce regimes.
pub const DEFAULT_PHASE_RATES: (f64, f64, f64) = (0.3, 0.5, 0.2);
pub const DEFAULT_PHASE_DAYS: usize = 30;
pub const DEFAULT_PHASE_NOISE: f64 = 0.02;

/// Three consecutive phases over `num_days`, split at 30% and 60%.
///
/// Each phase has a total multiplier spread evenly (in log space) over its
/// days. A phase that rounds down to zero days hands its multiplier to the
/// next non-empty phase, so the cumulative move over `num_days` is always the
/// product of all three. Days at or past `num_days` carry noise only.
#[derive(Debug, Clone, PartialEq)]
struct ThreePhase {
    multipliers: [f64; 3],
    num_days: usize,
    noise: f64,
}

impl ThreePhase {
    fn boundaries(&self) -> (usize, usize) {
        (self.num_days * 30 / 100, self.num_days * 60 / 100)
    }

    /// Per-day log drift on the given day of the regime.
    fn log_drift(&self, day: usize) -> f64 {
        let (p1, p2) = self.boundaries();
        let ends = [p1, p2, self.num_days];
        let mut start = 0;
        let mut carried = 0.0;
        for (multiplier, end) in self.multipliers.iter().zip(ends) {
            let len = end - start;
            if len == 0 {
                carried += multiplier.ln();
                continue;
            }
            if day < end {
                return (carried + multiplier.ln()) / len as f64;
            }
            carried = 0.0;
            start = end;
        }
        0.0
    }

    fn next_buy(&self, input: &StepInput, rng: &mut SimRng) -> f64 {
        let drift = self.log_drift(input.day_in_regime);
        input.prev.buy * (drift + self.noise * rng.next_normal()).exp()
    }
}

/// Drop, partial recovery, renewed decline.
///
/// - phase 1 multiplies the level by `1 - drop_rate`
/// - phase 2 recovers `recovery_rate` of the lost ground
/// - phase 3 multiplies the phase-2 peak by `1 - decline_rate`
#[derive(Debug, Clone, PartialEq)]
pub struct DeadCatBounceParams {
    phases: ThreePhase,
}

impl DeadCatBounceParams {
    pub fn new(
        drop_rate: f64,
        recovery_rate: f64,
        decline_rate: f64,
        num_days: usize,
        noise: f64,
    ) -> Result<Self, RegimeError> {
        in_range("dead_cat_bounce", "drop_rate", drop_rate, 0.0, 1.0)?;
        in_closed_range("dead_cat_bounce", "recovery_rate", recovery_rate, 0.0, 1.0)?;
        in_range("dead_cat_bounce", "decline_rate", decline_rate, 0.0, 1.0)?;
        if num_days == 0 {
            return Err(RegimeError::new("dead_cat_bounce", "num_days must be >= 1"));
        }
        non_negative("dead_cat_bounce", "noise", noise)?;
        Ok(Self::from_rates(drop_rate, recovery_rate, decline_rate, num_days, noise))
    }

    fn from_rates(
        drop_rate: f64,
        recovery_rate: f64,
        decline_rate: f64,
        num_days: usize,
        noise: f64,
    ) -> Self {
        let bottom = 1.0 - drop_rate;
        let bounce = 1.0 - drop_rate * (1.0 - recovery_rate);
        Self {
            phases: ThreePhase {
                multipliers: [bottom, bounce / bottom, 1.0 - decline_rate],
                num_days,
                noise,
            },
        }
    }

    /// Phase boundaries as days within the regime: (end of drop, end of recovery).
    pub fn boundaries(&self) -> (usize, usize) {
        self.phases.boundaries()
    }

    pub(crate) fn next_buy(&self, input: &StepInput, rng: &mut SimRng) -> f64 {
        self.phases.next_buy(input, rng)
    }
}

impl Default for DeadCatBounceParams {
    fn default() -> Self {
        let (a, b, c) = DEFAULT_PHASE_RATES;
        Self::from_rates(a, b, c, DEFAULT_PHASE_DAYS, DEFAULT_PHASE_NOISE)
    }
}

/// Mirror of the dead-cat bounce: rise, pullback, continued rise.
///
/// - phase 1 multiplies the level by `1 + rise_rate`
/// - phase 2 gives back `pullback_rate` of the gain
/// - phase 3 multiplies the pullback low by `1 + continue_rate`
#[derive(Debug, Clone, PartialEq)]
pub struct InverseDeadCatBounceParams {
    phases: ThreePhase,
}

impl InverseDeadCatBounceParams {
    pub fn new(
        rise_rate: f64,
        pullback_rate: f64,
        continue_rate: f64,
        num_days: usize,
        noise: f64,
    ) -> Result<Self, RegimeError> {
        non_negative("inverse_dead_cat_bounce", "rise_rate", rise_rate)?;
        in_closed_range("inverse_dead_cat_bounce", "pullback_rate", pullback_rate, 0.0, 1.0)?;
        non_negative("inverse_dead_cat_bounce", "continue_rate", continue_rate)?;
        if num_days == 0 {
            return Err(RegimeError::new("inverse_dead_cat_bounce", "num_days must be >= 1"));
        }
        non_negative("inverse_dead_cat_bounce", "noise", noise)?;
        Ok(Self::from_rates(rise_rate, pullback_rate, continue_rate, num_days, noise))
    }

    fn from_rates(
        rise_rate: f64,
        pullback_rate: f64,
        continue_rate: f64,
        num_days: usize,
        noise: f64,
    ) -> Self {
        let peak = 1.0 + rise_rate;
        let pullback = 1.0 + rise_rate * (1.0 - pullback_rate);
        Self {
            phases: ThreePhase {
                multipliers: [peak, pullback / peak, 1.0 + continue_rate],
                num_days,
                noise,
            },
        }
    }

    pub fn boundaries(&self) -> (usize, usize) {
        self.phases.boundaries()
    }

    pub(crate) fn next_buy(&self, input: &StepInput, rng: &mut SimRng) -> f64 {
        self.phases.next_buy(input, rng)
    }
}

impl Default for InverseDeadCatBounceParams {
    fn default() -> Self {
        let (a, b, c) = DEFAULT_PHASE_RATES;
        Self::from_rates(a, b, c, DEFAULT_PHASE_DAYS, DEFAULT_PHASE_NOISE)
    }
}
