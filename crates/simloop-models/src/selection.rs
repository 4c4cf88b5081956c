//! Selection on one heritable trait: directional, stabilizing, and disruptive fitness
//! landscapes reshaping a normally distributed population.

use std::fmt;

use rand::{Rng, rngs::SmallRng};
use serde::{Deserialize, Serialize};
use simloop_core::{EngineConfig, Model, StepReport};
use tracing::debug;

/// Traits live in `[0, TRAIT_MAX]`.
pub const TRAIT_MAX: f64 = 100.0;

/// Which trait values the environment favours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Higher values are fitter.
    #[default]
    Directional,
    /// Values near the middle are fitter.
    Stabilizing,
    /// Both extremes are fitter than the middle.
    Disruptive,
}

impl SelectionMode {
    /// Fitness in `[0, 1]` of a trait value.
    #[must_use]
    pub fn fitness(self, value: f64) -> f64 {
        let mid = TRAIT_MAX / 2.0;
        match self {
            Self::Directional => value / TRAIT_MAX,
            Self::Stabilizing => 1.0 - (value - mid).abs() / mid,
            Self::Disruptive => (value - mid).abs() / mid,
        }
    }

    /// Caption drawn above the histogram.
    #[must_use]
    pub const fn caption(self) -> &'static str {
        match self {
            Self::Directional => "Favors high values →",
            Self::Stabilizing => "Favors middle values",
            Self::Disruptive => "← Favors extremes →",
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Directional => "directional",
            Self::Stabilizing => "stabilizing",
            Self::Disruptive => "disruptive",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitPopulation {
    pub traits: Vec<f64>,
    pub generation: u32,
}

impl TraitPopulation {
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.traits.is_empty() {
            return 0.0;
        }
        self.traits.iter().sum::<f64>() / self.traits.len() as f64
    }

    /// Population (not sample) standard deviation.
    #[must_use]
    pub fn std_dev(&self) -> f64 {
        if self.traits.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let variance = self
            .traits
            .iter()
            .map(|t| (t - mean).powi(2))
            .sum::<f64>()
            / self.traits.len() as f64;
        variance.sqrt()
    }

    /// Head counts in `bins` equal-width bins over `[0, TRAIT_MAX]`; the top value lands
    /// in the last bin.
    #[must_use]
    pub fn histogram(&self, bins: usize) -> Vec<usize> {
        let mut counts = vec![0; bins];
        if bins == 0 {
            return counts;
        }
        let width = TRAIT_MAX / bins as f64;
        for &value in &self.traits {
            let bin = ((value / width).floor().max(0.0) as usize).min(bins - 1);
            counts[bin] += 1;
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionParams {
    pub mode: SelectionMode,
    pub population: usize,
    pub initial_mean: f64,
    pub initial_std_dev: f64,
    /// Offspring differ from their parent by up to half this span either way.
    pub mutation_span: f64,
    /// Added to every fitness so unfit individuals can still be drawn.
    pub base_weight: f64,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self {
            mode: SelectionMode::Directional,
            population: 200,
            initial_mean: 50.0,
            initial_std_dev: 15.0,
            mutation_span: 6.0,
            base_weight: 0.1,
        }
    }
}

/// Standard normal draw by the Box-Muller transform.
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // (0, 1] keeps the logarithm finite.
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// Roulette-wheel pick weighted by `weight`; falls back to the first entry when rounding
/// leaves the wheel unspent.
fn roulette<R, F>(rng: &mut R, traits: &[f64], total: f64, weight: F) -> Option<f64>
where
    R: Rng + ?Sized,
    F: Fn(f64) -> f64,
{
    let first = *traits.first()?;
    let mut remaining = rng.random::<f64>() * total;
    for &value in traits {
        remaining -= weight(value);
        if remaining <= 0.0 {
            return Some(value);
        }
    }
    Some(first)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TraitSelection;

impl Model for TraitSelection {
    const KIND: &'static str = "selection";
    const KNOB_DOCS: &'static [(&'static str, &'static str)] = &[
        ("mode", "directional, stabilizing or disruptive"),
        ("population", "individuals per generation"),
        ("mutation_span", "width of the offspring mutation window"),
    ];
    const RESET_KNOBS: &'static [&'static str] = &["mode", "population"];

    type State = TraitPopulation;
    type Params = SelectionParams;

    fn initialize(&self, params: &SelectionParams, rng: &mut SmallRng) -> TraitPopulation {
        let traits = (0..params.population)
            .map(|_| {
                (params.initial_mean + standard_normal(rng) * params.initial_std_dev)
                    .clamp(0.0, TRAIT_MAX)
            })
            .collect();
        TraitPopulation {
            traits,
            generation: 0,
        }
    }

    /// One generation: fitness-proportional parents, each child mutated and clamped.
    fn step(
        &self,
        state: &mut TraitPopulation,
        params: &SelectionParams,
        rng: &mut SmallRng,
    ) -> StepReport {
        let weight = |value: f64| params.mode.fitness(value) + params.base_weight;
        let total: f64 = state.traits.iter().map(|&t| weight(t)).sum();
        let mut next = Vec::with_capacity(params.population);
        for _ in 0..params.population {
            let Some(parent) = roulette(rng, &state.traits, total, weight) else {
                break;
            };
            let mutation = (rng.random::<f64>() - 0.5) * params.mutation_span;
            next.push((parent + mutation).clamp(0.0, TRAIT_MAX));
        }
        state.traits = next;
        state.generation += 1;
        debug!(
            generation = state.generation,
            mode = %params.mode,
            mean = state.mean(),
            "selection generation"
        );
        StepReport::generation()
    }

    fn engine_defaults(&self) -> EngineConfig {
        EngineConfig {
            frame_stride: 30,
            ..EngineConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn population(traits: Vec<f64>) -> TraitPopulation {
        TraitPopulation {
            traits,
            generation: 0,
        }
    }

    #[test]
    fn fitness_landscapes() {
        assert_eq!(SelectionMode::Directional.fitness(80.0), 0.8);
        assert_eq!(SelectionMode::Stabilizing.fitness(50.0), 1.0);
        assert_eq!(SelectionMode::Stabilizing.fitness(0.0), 0.0);
        assert_eq!(SelectionMode::Disruptive.fitness(50.0), 0.0);
        assert_eq!(SelectionMode::Disruptive.fitness(100.0), 1.0);
    }

    #[test]
    fn initial_population_is_clamped_around_the_mean() {
        let params = SelectionParams::default();
        let pop = TraitSelection.initialize(&params, &mut SmallRng::seed_from_u64(4));
        assert_eq!(pop.traits.len(), 200);
        assert!(pop.traits.iter().all(|t| (0.0..=TRAIT_MAX).contains(t)));
        assert!((pop.mean() - 50.0).abs() < 4.0, "mean {}", pop.mean());
        assert!((pop.std_dev() - 15.0).abs() < 3.0, "std {}", pop.std_dev());
    }

    #[test]
    fn std_dev_divides_by_the_population_size() {
        let pop = population(vec![40.0, 60.0]);
        assert_eq!(pop.mean(), 50.0);
        assert_eq!(pop.std_dev(), 10.0);
        assert_eq!(population(Vec::new()).std_dev(), 0.0);
    }

    #[test]
    fn histogram_puts_the_maximum_in_the_last_bin() {
        let pop = population(vec![0.0, 4.9, 5.0, 99.0, 100.0]);
        let bins = pop.histogram(20);
        assert_eq!(bins.len(), 20);
        assert_eq!(bins[0], 2);
        assert_eq!(bins[1], 1);
        assert_eq!(bins[19], 2);
        assert_eq!(bins.iter().sum::<usize>(), 5);
    }

    #[test]
    fn exhausted_wheel_falls_back_to_the_first_individual() {
        let mut rng = SmallRng::seed_from_u64(0);
        // An overstated total never runs out, so the pick defaults to the head.
        let pick = roulette(&mut rng, &[12.0, 80.0], 1e9, |_| 0.1);
        assert_eq!(pick, Some(12.0));
        assert_eq!(roulette(&mut rng, &[], 1.0, |_| 1.0), None);
    }

    #[test]
    fn mutation_stays_within_half_the_span_and_the_trait_range() {
        let params = SelectionParams {
            population: 50,
            ..SelectionParams::default()
        };
        let mut pop = population(vec![99.0; 50]);
        let report = TraitSelection.step(&mut pop, &params, &mut SmallRng::seed_from_u64(2));
        assert!(report.generation_advanced);
        assert_eq!(pop.generation, 1);
        assert!(pop.traits.iter().all(|t| (96.0..=TRAIT_MAX).contains(t)));
    }

    #[test]
    fn each_mode_moves_the_population_its_own_way() {
        let run = |mode| {
            let params = SelectionParams {
                mode,
                ..SelectionParams::default()
            };
            let mut rng = SmallRng::seed_from_u64(17);
            let mut pop = TraitSelection.initialize(&params, &mut rng);
            let start = (pop.mean(), pop.std_dev());
            for _ in 0..25 {
                TraitSelection.step(&mut pop, &params, &mut rng);
            }
            (start, (pop.mean(), pop.std_dev()))
        };

        let ((mean0, _), (mean1, _)) = run(SelectionMode::Directional);
        assert!(mean1 > mean0 + 10.0, "{mean0} -> {mean1}");

        let ((_, std0), (_, std1)) = run(SelectionMode::Stabilizing);
        assert!(std1 < std0, "{std0} -> {std1}");

        let ((_, std0), (_, std1)) = run(SelectionMode::Disruptive);
        assert!(std1 > std0, "{std0} -> {std1}");
    }
}
