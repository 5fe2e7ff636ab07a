//! Biased walks (drop, spike) and the sinusoidal regime.

use super::{finite, in_range, StepInput};
use crate::error::RegimeError;
use crate::rng::SimRng;

/// Steady decline: `next = prev * (1 + U) * (1 - rate)`, `U ~ U[-rate, rate)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DropParams {
    pub(crate) rate: f64,
}

impl DropParams {
    pub fn new(rate: f64) -> Result<Self, RegimeError> {
        in_range("drop", "rate", rate, 0.0, 1.0)?;
        Ok(Self { rate })
    }

    pub(crate) fn next_buy(&self, input: &StepInput, rng: &mut SimRng) -> f64 {
        let noisy = input.prev.buy * (1.0 + rng.next_symmetric(self.rate));
        noisy * (1.0 - self.rate)
    }
}

impl Default for DropParams {
    fn default() -> Self {
        Self { rate: 0.01 }
    }
}

/// Steady rise: `next = prev * (1 + U) * (1 + rate)`, `U ~ U[-rate, rate)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpikeParams {
    pub(crate) rate: f64,
}

impl SpikeParams {
    pub fn new(rate: f64) -> Result<Self, RegimeError> {
        in_range("spike", "rate", rate, 0.0, 1.0)?;
        Ok(Self { rate })
    }

    pub(crate) fn next_buy(&self, input: &StepInput, rng: &mut SimRng) -> f64 {
        let noisy = input.prev.buy * (1.0 + rng.next_symmetric(self.rate));
        noisy * (1.0 + self.rate)
    }
}

impl Default for SpikeParams {
    fn default() -> Self {
        Self { rate: 0.05 }
    }
}

/// Deterministic sinusoid in the absolute day index plus uniform noise:
/// `next = prev * (1 + U) + amplitude * sin(day + phase)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SineWaveParams {
    pub(crate) volatility: f64,
    pub(crate) amplitude: f64,
    pub(crate) phase: f64,
}

impl SineWaveParams {
    pub fn new(volatility: f64, amplitude: f64, phase: f64) -> Result<Self, RegimeError> {
        in_range("sine_wave", "volatility", volatility, 0.0, 1.0)?;
        finite("sine_wave", "amplitude", amplitude)?;
        finite("sine_wave", "phase", phase)?;
        Ok(Self {
            volatility,
            amplitude,
            phase,
        })
    }

    pub(crate) fn next_buy(&self, input: &StepInput, rng: &mut SimRng) -> f64 {
        let noisy = input.prev.buy * (1.0 + rng.next_symmetric(self.volatility));
        noisy + self.amplitude * (input.day as f64 + self.phase).sin()
    }
}

impl Default for SineWaveParams {
    fn default() -> Self {
        Self {
            volatility: 0.01,
            amplitude: 1.0,
            phase: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::Quote;

    fn at(buy: f64, day: usize) -> StepInput {
        StepInput {
            prev: Quote::new(buy, buy * 0.99),
            prior_buy: None,
            day,
            day_in_regime: day,
        }
    }

    #[test]
    fn drop_stays_within_noise_band() {
        let p = DropParams::new(0.05).unwrap();
        let mut rng = SimRng::seeded(42);
        for _ in 0..1000 {
            let next = p.next_buy(&at(100.0, 0), &mut rng);
            // 100 * [0.95, 1.05) * 0.95
            assert!((90.25..99.75).contains(&next), "drop step {next}");
        }
    }

    #[test]
    fn spike_stays_within_noise_band() {
        let p = SpikeParams::new(0.05).unwrap();
        let mut rng = SimRng::seeded(42);
        for _ in 0..1000 {
            let next = p.next_buy(&at(100.0, 0), &mut rng);
            // 100 * [0.95, 1.05) * 1.05
            assert!((99.75..110.25).contains(&next), "spike step {next}");
        }
    }

    #[test]
    fn zero_rate_is_flat() {
        let mut rng = SimRng::seeded(1);
        assert_eq!(DropParams::new(0.0).unwrap().next_buy(&at(100.0, 0), &mut rng), 100.0);
        assert_eq!(SpikeParams::new(0.0).unwrap().next_buy(&at(100.0, 0), &mut rng), 100.0);
    }

    #[test]
    fn noiseless_sine_follows_day_index() {
        let p = SineWaveParams::new(0.0, 2.0, 0.5).unwrap();
        let mut rng = SimRng::seeded(1);
        let next = p.next_buy(&at(100.0, 3), &mut rng);
        assert!((next - (100.0 + 2.0 * 3.5_f64.sin())).abs() < 1e-12);
    }
}
