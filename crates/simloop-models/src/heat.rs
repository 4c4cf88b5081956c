//! Heat transfer between a hot and a cold body until both reach the mean temperature.

use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use simloop_core::{Model, StepReport};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bodies {
    /// Current temperature of the body that started hot, in °C.
    pub hot: f64,
    pub cold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatParams {
    /// Starting temperature of the hot body.
    pub hot: f64,
    pub cold: f64,
    /// Fraction of the remaining gap closed per step.
    pub rate: f64,
    /// Gap to equilibrium below which both bodies snap to it.
    pub tolerance: f64,
}

impl HeatParams {
    /// Temperature both bodies settle at.
    #[must_use]
    pub fn equilibrium(&self) -> f64 {
        (self.hot + self.cold) / 2.0
    }
}

impl Default for HeatParams {
    fn default() -> Self {
        Self {
            hot: 100.0,
            cold: 0.0,
            rate: 0.02,
            tolerance: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeatTransfer;

impl Model for HeatTransfer {
    const KIND: &'static str = "heat";
    const KNOB_DOCS: &'static [(&'static str, &'static str)] = &[
        ("hot", "starting temperature of the hot body (°C)"),
        ("cold", "starting temperature of the cold body (°C)"),
        ("rate", "fraction of the gap closed each step"),
    ];
    const RESET_KNOBS: &'static [&'static str] = &["hot", "cold"];

    type State = Bodies;
    type Params = HeatParams;

    fn initialize(&self, params: &HeatParams, _rng: &mut SmallRng) -> Bodies {
        Bodies {
            hot: params.hot,
            cold: params.cold,
        }
    }

    fn step(&self, state: &mut Bodies, params: &HeatParams, _rng: &mut SmallRng) -> StepReport {
        let target = params.equilibrium();
        state.hot += (target - state.hot) * params.rate;
        state.cold += (target - state.cold) * params.rate;
        if (state.hot - target).abs() < params.tolerance {
            state.hot = target;
            state.cold = target;
        }
        StepReport::default()
    }

    fn is_finished(&self, state: &Bodies, params: &HeatParams) -> bool {
        let target = params.equilibrium();
        state.hot == target && state.cold == target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn each_step_closes_a_fixed_fraction_of_the_gap() {
        let params = HeatParams::default();
        let mut rng = SmallRng::seed_from_u64(0);
        let mut bodies = HeatTransfer.initialize(&params, &mut rng);
        HeatTransfer.step(&mut bodies, &params, &mut rng);
        assert!((bodies.hot - 99.0).abs() < 1e-12);
        assert!((bodies.cold - 1.0).abs() < 1e-12);
        assert!(!HeatTransfer.is_finished(&bodies, &params));
    }

    #[test]
    fn bodies_snap_to_equilibrium_within_tolerance() {
        let params = HeatParams::default();
        let mut rng = SmallRng::seed_from_u64(0);
        let mut bodies = HeatTransfer.initialize(&params, &mut rng);
        let mut steps = 0;
        while !HeatTransfer.is_finished(&bodies, &params) {
            HeatTransfer.step(&mut bodies, &params, &mut rng);
            assert!(bodies.hot >= bodies.cold);
            steps += 1;
            assert!(steps < 1000, "never settled");
        }
        assert_eq!(bodies, Bodies { hot: 50.0, cold: 50.0 });
        // 50 · 0.98^n < 0.5 first holds at n = 228.
        assert_eq!(steps, 228);
    }

    #[test]
    fn reversed_bodies_meet_in_the_middle() {
        let params = HeatParams {
            hot: 20.0,
            cold: 80.0,
            ..HeatParams::default()
        };
        let mut rng = SmallRng::seed_from_u64(0);
        let mut bodies = HeatTransfer.initialize(&params, &mut rng);
        for _ in 0..400 {
            HeatTransfer.step(&mut bodies, &params, &mut rng);
        }
        assert!(HeatTransfer.is_finished(&bodies, &params));
        assert_eq!(bodies.hot, 50.0);
    }
}
