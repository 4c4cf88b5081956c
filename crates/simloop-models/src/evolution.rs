//! Natural selection: creatures with heritable speed and size compete for food.
//!
//! Bigger creatures reach more food but burn energy with the square of their size.
//! When food runs low or the population collapses, the best-fed fraction becomes the
//! parent pool for an entirely new population of mutated offspring.

use rand::{Rng, rngs::SmallRng};
use serde::{Deserialize, Serialize};
use simloop_core::{Model, Position, StepReport, Velocity};
use tracing::debug;

use crate::{jitter_velocity, random_position};

/// Bounds every heritable trait is clamped to after mutation.
pub const TRAIT_RANGE: (f32, f32) = (0.3, 2.0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    pub position: Position,
    pub velocity: Velocity,
    pub speed: f32,
    pub size: f32,
    pub energy: f32,
}

impl Creature {
    /// Fraction of starting energy left, clamped to `[0, 1]`.
    #[must_use]
    pub fn energy_ratio(&self, initial_energy: f32) -> f32 {
        if initial_energy <= 0.0 {
            return 0.0;
        }
        (self.energy / initial_energy).clamp(0.0, 1.0)
    }
}

/// Mean heritable traits of a population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitAverages {
    pub speed: f32,
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habitat {
    pub creatures: Vec<Creature>,
    pub food: Vec<Position>,
}

impl Habitat {
    /// `None` for an extinct population.
    #[must_use]
    pub fn averages(&self) -> Option<TraitAverages> {
        if self.creatures.is_empty() {
            return None;
        }
        let n = self.creatures.len() as f32;
        let (speed, size) = self
            .creatures
            .iter()
            .fold((0.0, 0.0), |(speed, size), c| (speed + c.speed, size + c.size));
        Some(TraitAverages {
            speed: speed / n,
            size: size / n,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionParams {
    pub width: f32,
    pub height: f32,
    pub population: usize,
    /// Per-trait mutation chance, percent.
    pub mutation_rate: f32,
    /// Selection pressure 1 (mild) to 3 (harsh); fewer food items at higher pressure.
    pub pressure: u32,
    pub initial_energy: f32,
    pub food_energy: f32,
    /// Energy burned per step for a creature of size 1.
    pub metabolism: f32,
    /// Eating reach for a creature of size 1.
    pub eat_radius: f32,
    pub survivor_fraction: f32,
    pub min_survivors: usize,
    /// A generation ends when fewer food items than this remain.
    pub min_food: usize,
    /// Largest trait change a single mutation can apply.
    pub mutation_span: f32,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
            population: 30,
            mutation_rate: 5.0,
            pressure: 2,
            initial_energy: 100.0,
            food_energy: 50.0,
            metabolism: 0.3,
            eat_radius: 10.0,
            survivor_fraction: 0.4,
            min_survivors: 5,
            min_food: 5,
            mutation_span: 0.2,
        }
    }
}

impl EvolutionParams {
    /// Food placed at the start of every generation.
    #[must_use]
    pub fn food_count(&self) -> usize {
        20 + (3 - self.pressure.clamp(1, 3)) as usize * 10
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalSelection;

impl NaturalSelection {
    fn spawn_food(params: &EvolutionParams, rng: &mut SmallRng) -> Vec<Position> {
        (0..params.food_count())
            .map(|_| random_position(rng, params.width, params.height, 0.0))
            .collect()
    }

    fn mutate(value: f32, params: &EvolutionParams, rng: &mut SmallRng) -> f32 {
        if rng.random::<f32>() * 100.0 < params.mutation_rate {
            let delta = (rng.random::<f32>() - 0.5) * params.mutation_span;
            (value + delta).clamp(TRAIT_RANGE.0, TRAIT_RANGE.1)
        } else {
            value
        }
    }

    fn forage(creature: &mut Creature, food: &mut Vec<Position>, params: &EvolutionParams) {
        let nearest = food
            .iter()
            .copied()
            .min_by(|a, b| {
                creature
                    .position
                    .distance_sq(*a)
                    .total_cmp(&creature.position.distance_sq(*b))
            });
        if let Some(target) = nearest {
            let (dx, dy) = (target.x - creature.position.x, target.y - creature.position.y);
            let dist = (dx * dx + dy * dy).sqrt();
            if dist > 0.0 {
                let pace = creature.speed * 2.0;
                creature.velocity = Velocity::new(dx / dist * pace, dy / dist * pace);
            }
        }

        let pos = &mut creature.position;
        pos.x += creature.velocity.vx;
        pos.y += creature.velocity.vy;
        if pos.x < 0.0 {
            pos.x = params.width;
        } else if pos.x > params.width {
            pos.x = 0.0;
        }
        if pos.y < 0.0 {
            pos.y = params.height;
        } else if pos.y > params.height {
            pos.y = 0.0;
        }

        creature.energy -= params.metabolism * creature.size * creature.size;

        let reach = params.eat_radius * creature.size;
        let reach_sq = reach * reach;
        let before = food.len();
        let here = creature.position;
        food.retain(|f| here.distance_sq(*f) >= reach_sq);
        creature.energy += (before - food.len()) as f32 * params.food_energy;
    }

    /// Replace the whole population with mutated offspring of the best-fed creatures.
    fn next_generation(habitat: &mut Habitat, params: &EvolutionParams, rng: &mut SmallRng) {
        let mut parents = std::mem::take(&mut habitat.creatures);
        parents.sort_by(|a, b| b.energy.total_cmp(&a.energy));
        let keep = ((parents.len() as f32 * params.survivor_fraction).floor() as usize)
            .max(params.min_survivors)
            .min(parents.len());
        parents.truncate(keep);

        if !parents.is_empty() {
            habitat.creatures = (0..params.population)
                .map(|_| {
                    let parent = &parents[rng.random_range(0..parents.len())];
                    Self::offspring(parent, params, rng)
                })
                .collect();
        }
        habitat.food = Self::spawn_food(params, rng);
        debug!(
            parents = parents.len(),
            population = habitat.creatures.len(),
            "selected next generation"
        );
    }

    /// Fresh creature at a random spot carrying `parent`'s traits, possibly mutated.
    fn offspring(parent: &Creature, params: &EvolutionParams, rng: &mut SmallRng) -> Creature {
        Creature {
            position: random_position(rng, params.width, params.height, 0.0),
            velocity: jitter_velocity(rng, 2.0),
            speed: Self::mutate(parent.speed, params, rng),
            size: Self::mutate(parent.size, params, rng),
            energy: params.initial_energy,
        }
    }
}

impl Model for NaturalSelection {
    const KIND: &'static str = "evolution";
    const KNOB_DOCS: &'static [(&'static str, &'static str)] = &[
        ("mutation_rate", "per-trait mutation chance in percent"),
        ("pressure", "selection pressure 1-3; higher means less food"),
        ("population", "creatures after each generation refill"),
    ];

    type State = Habitat;
    type Params = EvolutionParams;

    fn initialize(&self, params: &EvolutionParams, rng: &mut SmallRng) -> Habitat {
        let creatures = (0..params.population)
            .map(|_| Creature {
                position: random_position(rng, params.width, params.height, 0.0),
                velocity: jitter_velocity(rng, 2.0),
                speed: 0.8 + rng.random::<f32>() * 0.4,
                size: 0.8 + rng.random::<f32>() * 0.4,
                energy: params.initial_energy,
            })
            .collect();
        Habitat {
            creatures,
            food: Self::spawn_food(params, rng),
        }
    }

    fn step(&self, state: &mut Habitat, params: &EvolutionParams, rng: &mut SmallRng) -> StepReport {
        for creature in &mut state.creatures {
            Self::forage(creature, &mut state.food, params);
        }
        state.creatures.retain(|c| c.energy > 0.0);

        if state.food.len() < params.min_food || state.creatures.len() < params.min_survivors {
            Self::next_generation(state, params, rng);
            return StepReport::generation();
        }
        StepReport::default()
    }

    fn is_finished(&self, state: &Habitat, _params: &EvolutionParams) -> bool {
        state.creatures.is_empty()
    }
}
