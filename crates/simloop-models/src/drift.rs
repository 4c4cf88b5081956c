//! Genetic drift: allele frequency under pure binomial resampling in a small and a large population.

use rand::{Rng, rngs::SmallRng};
use serde::{Deserialize, Serialize};
use simloop_core::{EngineConfig, Model, Position, StepReport};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftState {
    pub small: f64,
    pub large: f64,
    pub generation: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftParams {
    pub small_population: u32,
    pub large_population: u32,
    pub initial_frequency: f64,
    pub max_generations: u32,
}

impl Default for DriftParams {
    fn default() -> Self {
        Self {
            small_population: 20,
            large_population: 500,
            initial_frequency: 0.5,
            max_generations: 50,
        }
    }
}

/// Frequency of the allele among `population` offspring drawn at frequency `freq`.
pub fn resample<R: Rng + ?Sized>(rng: &mut R, freq: f64, population: u32) -> f64 {
    if population == 0 {
        return freq;
    }
    let carriers = (0..population)
        .filter(|_| rng.random::<f64>() < freq)
        .count();
    carriers as f64 / f64::from(population)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GeneticDrift;

impl Model for GeneticDrift {
    const KIND: &'static str = "drift";
    const KNOB_DOCS: &'static [(&'static str, &'static str)] = &[
        ("small_population", "size of the drifting population"),
        ("large_population", "size of the stable population"),
        ("max_generations", "generations simulated"),
    ];

    type State = DriftState;
    type Params = DriftParams;

    fn initialize(&self, params: &DriftParams, _rng: &mut SmallRng) -> DriftState {
        let freq = params.initial_frequency.clamp(0.0, 1.0);
        DriftState {
            small: freq,
            large: freq,
            generation: 0,
        }
    }

    fn step(&self, state: &mut DriftState, params: &DriftParams, rng: &mut SmallRng) -> StepReport {
        state.small = resample(rng, state.small, params.small_population);
        state.large = resample(rng, state.large, params.large_population);
        state.generation += 1;
        StepReport::generation()
    }

    /// `(generation, frequency)` for the small then the large population.
    fn trace(&self, state: &DriftState, _params: &DriftParams, points: &mut Vec<Position>) {
        let g = state.generation as f32;
        points.extend([
            Position::new(g, state.small as f32),
            Position::new(g, state.large as f32),
        ]);
    }

    fn is_finished(&self, state: &DriftState, params: &DriftParams) -> bool {
        state.generation >= params.max_generations
    }

    fn engine_defaults(&self) -> EngineConfig {
        EngineConfig {
            frame_stride: 3,
            trail_capacity: 1000,
            ..EngineConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn fixed_alleles_stay_fixed() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(resample(&mut rng, 0.0, 50), 0.0);
        assert_eq!(resample(&mut rng, 1.0, 50), 1.0);
    }

    #[test]
    fn run_stops_at_max_generations_with_valid_frequencies() {
        let params = DriftParams::default();
        let mut rng = SmallRng::seed_from_u64(21);
        let mut state = GeneticDrift.initialize(&params, &mut rng);
        let mut steps = 0;
        while !GeneticDrift.is_finished(&state, &params) {
            let report = GeneticDrift.step(&mut state, &params, &mut rng);
            assert!(report.generation_advanced);
            assert!((0.0..=1.0).contains(&state.small));
            assert!((0.0..=1.0).contains(&state.large));
            steps += 1;
        }
        assert_eq!(steps, 50);
    }

    #[test]
    fn small_populations_drift_further_on_average() {
        let params = DriftParams::default();
        let mut rng = SmallRng::seed_from_u64(99);
        let (mut small_dev, mut large_dev) = (0.0, 0.0);
        for _ in 0..200 {
            let mut state = GeneticDrift.initialize(&params, &mut rng);
            for _ in 0..20 {
                GeneticDrift.step(&mut state, &params, &mut rng);
            }
            small_dev += (state.small - 0.5).abs();
            large_dev += (state.large - 0.5).abs();
        }
        assert!(small_dev > large_dev * 2.0, "{small_dev} vs {large_dev}");
    }
}
