//! Compartmental SIR model integrated as population fractions.

use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use simloop_core::{EngineConfig, Model, Position, StepReport};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SirState {
    pub susceptible: f64,
    pub infected: f64,
    pub recovered: f64,
    /// Simulated days.
    pub time: f64,
    /// Largest infected fraction seen so far.
    pub peak_infected: f64,
}

impl SirState {
    /// Fraction of the population that has been infected at some point.
    #[must_use]
    pub fn total_infected(&self) -> f64 {
        self.infected + self.recovered
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SirParams {
    /// Transmission rate.
    pub beta: f64,
    /// Recovery rate.
    pub gamma: f64,
    pub dt: f64,
    pub max_time: f64,
    pub initial_infected: f64,
    /// The epidemic is over once the infected fraction drops below this.
    pub extinction_threshold: f64,
}

impl Default for SirParams {
    fn default() -> Self {
        Self {
            beta: 0.5,
            gamma: 0.2,
            dt: 0.1,
            max_time: 100.0,
            initial_infected: 0.01,
            extinction_threshold: 0.001,
        }
    }
}

impl SirParams {
    /// Basic reproduction number `β / γ`.
    #[must_use]
    pub fn r0(&self) -> f64 {
        self.beta / self.gamma
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SirOde;

impl Model for SirOde {
    const KIND: &'static str = "sir";
    const KNOB_DOCS: &'static [(&'static str, &'static str)] = &[
        ("beta", "transmission rate"),
        ("gamma", "recovery rate"),
        ("max_time", "days simulated before stopping"),
    ];

    type State = SirState;
    type Params = SirParams;

    fn initialize(&self, params: &SirParams, _rng: &mut SmallRng) -> SirState {
        let infected = params.initial_infected.clamp(0.0, 1.0);
        SirState {
            susceptible: 1.0 - infected,
            infected,
            recovered: 0.0,
            time: 0.0,
            peak_infected: infected,
        }
    }

    fn step(&self, state: &mut SirState, params: &SirParams, _rng: &mut SmallRng) -> StepReport {
        let infections = params.beta * state.susceptible * state.infected;
        let recoveries = params.gamma * state.infected;

        state.susceptible = (state.susceptible - infections * params.dt).clamp(0.0, 1.0);
        state.infected = (state.infected + (infections - recoveries) * params.dt).clamp(0.0, 1.0);
        state.recovered = (state.recovered + recoveries * params.dt).clamp(0.0, 1.0);
        state.time += params.dt;
        state.peak_infected = state.peak_infected.max(state.infected);
        StepReport::default()
    }

    /// One curve per compartment, `(day, fraction)`.
    fn trace(&self, state: &SirState, _params: &SirParams, points: &mut Vec<Position>) {
        let t = state.time as f32;
        points.extend([
            Position::new(t, state.susceptible as f32),
            Position::new(t, state.infected as f32),
            Position::new(t, state.recovered as f32),
        ]);
    }

    fn is_finished(&self, state: &SirState, params: &SirParams) -> bool {
        state.infected < params.extinction_threshold || state.time >= params.max_time
    }

    fn engine_defaults(&self) -> EngineConfig {
        EngineConfig {
            substeps: 5,
            trail_capacity: 1024,
            trail_every_substep: true,
            ..EngineConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn run(params: &SirParams) -> (SirState, usize) {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut state = SirOde.initialize(params, &mut rng);
        let mut steps = 0;
        while !SirOde.is_finished(&state, params) {
            SirOde.step(&mut state, params, &mut rng);
            steps += 1;
        }
        (state, steps)
    }

    #[test]
    fn compartments_stay_normalised() {
        let params = SirParams::default();
        let mut rng = SmallRng::seed_from_u64(0);
        let mut state = SirOde.initialize(&params, &mut rng);
        for _ in 0..500 {
            SirOde.step(&mut state, &params, &mut rng);
            let total = state.susceptible + state.infected + state.recovered;
            assert!((total - 1.0).abs() < 1e-9, "total {total}");
        }
    }

    #[test]
    fn outbreak_above_threshold_peaks_then_stops() {
        let params = SirParams::default();
        assert!((params.r0() - 2.5).abs() < 1e-12);
        let (state, steps) = run(&params);
        assert!(state.peak_infected > 0.1, "peak {}", state.peak_infected);
        assert!(state.total_infected() > 0.5);
        assert!(steps <= 1001);
    }

    #[test]
    fn subcritical_outbreak_dies_out_quickly() {
        let params = SirParams {
            beta: 0.1,
            gamma: 0.5,
            ..SirParams::default()
        };
        let (state, _) = run(&params);
        assert!(state.infected < params.extinction_threshold);
        assert!(state.time < params.max_time);
        assert!((state.peak_infected - params.initial_infected).abs() < 1e-12);
    }
}
