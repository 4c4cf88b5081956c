//! Agent-based epidemic: people wander a box and infect neighbours within a contact radius.

use ordered_float::OrderedFloat;
use rand::{Rng, rngs::SmallRng, seq::index};
use serde::{Deserialize, Serialize};
use simloop_core::{EngineConfig, Interactive, Model, Position, StepReport, Velocity};
use simloop_index::{IndexError, NeighborhoodIndex, UniformGridIndex};
use tracing::{debug, warn};

use crate::{jitter_velocity, random_position};

/// Disease label of one person.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Health {
    #[default]
    Susceptible,
    Infected,
    Recovered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub position: Position,
    pub velocity: Velocity,
    pub health: Health,
    /// Steps spent infected; zero otherwise.
    pub infected_for: u32,
}

impl Person {
    fn infect(&mut self) {
        self.health = Health::Infected;
        self.infected_for = 0;
    }
}

/// Head counts per label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCounts {
    pub susceptible: usize,
    pub infected: usize,
    pub recovered: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crowd {
    pub people: Vec<Person>,
}

impl Crowd {
    #[must_use]
    pub fn counts(&self) -> HealthCounts {
        self.people
            .iter()
            .fold(HealthCounts::default(), |mut counts, person| {
                match person.health {
                    Health::Susceptible => counts.susceptible += 1,
                    Health::Infected => counts.infected += 1,
                    Health::Recovered => counts.recovered += 1,
                }
                counts
            })
    }

    fn index(&self, cell_size: f32) -> Result<UniformGridIndex, IndexError> {
        let positions: Vec<(f32, f32)> = self
            .people
            .iter()
            .map(|p| (p.position.x, p.position.y))
            .collect();
        UniformGridIndex::build(cell_size.max(1.0), &positions)
    }

    /// Contact index for a step, or `None` (logged) when the radius cannot grid.
    fn contact_index(&self, radius: f32, purpose: &'static str) -> Option<UniformGridIndex> {
        self.index(radius)
            .inspect_err(|err| warn!(radius, purpose, %err, "skipping contact search"))
            .ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadParams {
    pub width: f32,
    pub height: f32,
    pub population: usize,
    pub initial_infected: usize,
    pub contact_radius: f32,
    /// Chance that one infected/susceptible pair in contact transmits during one step.
    pub contact_probability: f32,
    /// Steps after which an infected person recovers.
    pub recovery_steps: u32,
    /// Span of the initial per-axis velocity.
    pub speed: f32,
    pub spawn_padding: f32,
    /// Distance from the walls at which people bounce.
    pub wall_margin: f32,
    /// Pick radius for click-to-infect.
    pub pick_radius: f32,
}

impl Default for SpreadParams {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
            population: 200,
            initial_infected: 0,
            contact_radius: 30.0,
            contact_probability: 0.02,
            recovery_steps: 100,
            speed: 0.5,
            spawn_padding: 20.0,
            wall_margin: 10.0,
            pick_radius: 20.0,
        }
    }
}

/// User actions on the crowd.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpreadAction {
    /// Infect the nearest susceptible person within the pick radius of a point.
    InfectNear { x: f32, y: f32 },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpatialSpread;

impl SpatialSpread {
    fn move_and_recover(person: &mut Person, params: &SpreadParams) {
        person.position.x += person.velocity.vx;
        person.position.y += person.velocity.vy;

        let margin = params.wall_margin;
        let (max_x, max_y) = (params.width - margin, params.height - margin);
        if person.position.x < margin || person.position.x > max_x {
            person.velocity.vx = -person.velocity.vx;
            person.position.x = person.position.x.clamp(margin, max_x.max(margin));
        }
        if person.position.y < margin || person.position.y > max_y {
            person.velocity.vy = -person.velocity.vy;
            person.position.y = person.position.y.clamp(margin, max_y.max(margin));
        }

        if person.health == Health::Infected {
            person.infected_for += 1;
            if person.infected_for > params.recovery_steps {
                person.health = Health::Recovered;
            }
        }
    }
}

impl Model for SpatialSpread {
    const KIND: &'static str = "spread";
    const KNOB_DOCS: &'static [(&'static str, &'static str)] = &[
        ("contact_radius", "distance within which infection can pass"),
        ("contact_probability", "per-pair transmission chance each step"),
        ("recovery_steps", "steps until an infected person recovers"),
        ("population", "people created on reset"),
    ];

    type State = Crowd;
    type Params = SpreadParams;

    fn initialize(&self, params: &SpreadParams, rng: &mut SmallRng) -> Crowd {
        let mut people: Vec<Person> = (0..params.population)
            .map(|_| Person {
                position: random_position(rng, params.width, params.height, params.spawn_padding),
                velocity: jitter_velocity(rng, params.speed),
                health: Health::Susceptible,
                infected_for: 0,
            })
            .collect();
        let seeded = params.initial_infected.min(people.len());
        for idx in index::sample(rng, people.len(), seeded) {
            people[idx].infect();
        }
        Crowd { people }
    }

    fn step(&self, state: &mut Crowd, params: &SpreadParams, rng: &mut SmallRng) -> StepReport {
        for person in &mut state.people {
            Self::move_and_recover(person, params);
        }

        let spreaders: Vec<usize> = state
            .people
            .iter()
            .enumerate()
            .filter(|(_, p)| p.health == Health::Infected)
            .map(|(idx, _)| idx)
            .collect();
        if spreaders.is_empty() {
            return StepReport::default();
        }
        let Some(index) = state.contact_index(params.contact_radius, "transmission") else {
            return StepReport::default();
        };

        let radius_sq = params.contact_radius * params.contact_radius;
        let mut newly_infected = Vec::new();
        for &spreader in &spreaders {
            index.neighbors_within(spreader, radius_sq, &mut |idx, _| {
                if state.people[idx].health == Health::Susceptible
                    && rng.random::<f32>() < params.contact_probability
                {
                    newly_infected.push(idx);
                }
            });
        }
        for idx in newly_infected {
            state.people[idx].infect();
        }
        StepReport::default()
    }

    fn is_finished(&self, state: &Crowd, _params: &SpreadParams) -> bool {
        let counts = state.counts();
        counts.infected == 0 && counts.recovered > 0
    }
}

impl Interactive for SpatialSpread {
    type Action = SpreadAction;

    fn interact(&self, state: &mut Crowd, params: &SpreadParams, action: SpreadAction) -> bool {
        let SpreadAction::InfectNear { x, y } = action;
        let Some(index) = state.contact_index(params.pick_radius, "pick") else {
            return false;
        };
        let radius_sq = params.pick_radius * params.pick_radius;
        let people = &state.people;
        let picked = index.nearest_matching(x, y, radius_sq, &|idx| {
            people[idx].health == Health::Susceptible
        });
        match picked {
            Some((idx, OrderedFloat(dist_sq))) => {
                debug!(person = idx, distance = dist_sq.sqrt(), "infecting picked person");
                state.people[idx].infect();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn person(x: f32, y: f32, health: Health) -> Person {
        Person {
            position: Position::new(x, y),
            velocity: Velocity::default(),
            health,
            infected_for: 0,
        }
    }

    #[test]
    fn initial_crowd_has_requested_infections_inside_padding() {
        let params = SpreadParams {
            initial_infected: 5,
            ..SpreadParams::default()
        };
        let crowd = SpatialSpread.initialize(&params, &mut SmallRng::seed_from_u64(3));
        assert_eq!(crowd.people.len(), 200);
        assert_eq!(crowd.counts().infected, 5);
        for p in &crowd.people {
            assert!((20.0..=580.0).contains(&p.position.x));
            assert!((20.0..=380.0).contains(&p.position.y));
            assert!(p.velocity.vx.abs() <= 0.25 && p.velocity.vy.abs() <= 0.25);
        }
    }

    #[test]
    fn default_crowd_waits_for_a_click() {
        let crowd =
            SpatialSpread.initialize(&SpreadParams::default(), &mut SmallRng::seed_from_u64(9));
        let counts = crowd.counts();
        assert_eq!(counts.susceptible, 200);
        assert_eq!(counts.infected, 0);
        assert!(!SpatialSpread.is_finished(&crowd, &SpreadParams::default()));
    }

    #[test]
    fn unbounded_radius_skips_transmission_and_picking() {
        let params = SpreadParams {
            contact_radius: f32::INFINITY,
            pick_radius: f32::INFINITY,
            contact_probability: 1.0,
            ..SpreadParams::default()
        };
        let mut crowd = Crowd {
            people: vec![
                person(100.0, 100.0, Health::Infected),
                person(105.0, 100.0, Health::Susceptible),
            ],
        };
        assert!(crowd.index(params.contact_radius).is_err());
        SpatialSpread.step(&mut crowd, &params, &mut SmallRng::seed_from_u64(0));
        assert_eq!(crowd.people[1].health, Health::Susceptible);
        assert!(!SpatialSpread.interact(
            &mut crowd,
            &params,
            SpreadAction::InfectNear { x: 105.0, y: 100.0 }
        ));
    }

    #[test]
    fn walls_reflect_and_clamp() {
        let params = SpreadParams::default();
        let mut p = person(9.5, 200.0, Health::Susceptible);
        p.velocity = Velocity::new(-1.0, 0.0);
        SpatialSpread::move_and_recover(&mut p, &params);
        assert_eq!(p.position.x, 10.0);
        assert_eq!(p.velocity.vx, 1.0);
    }

    #[test]
    fn infected_recover_after_the_configured_steps() {
        let params = SpreadParams {
            recovery_steps: 3,
            ..SpreadParams::default()
        };
        let mut p = person(100.0, 100.0, Health::Infected);
        for _ in 0..3 {
            SpatialSpread::move_and_recover(&mut p, &params);
        }
        assert_eq!(p.health, Health::Infected);
        SpatialSpread::move_and_recover(&mut p, &params);
        assert_eq!(p.health, Health::Recovered);
    }

    #[test]
    fn newly_infected_do_not_spread_in_the_same_step() {
        let params = SpreadParams {
            contact_radius: 15.0,
            contact_probability: 1.0,
            ..SpreadParams::default()
        };
        let mut crowd = Crowd {
            people: vec![
                person(100.0, 100.0, Health::Infected),
                person(110.0, 100.0, Health::Susceptible),
                person(120.0, 100.0, Health::Susceptible),
            ],
        };
        let mut rng = SmallRng::seed_from_u64(0);
        SpatialSpread.step(&mut crowd, &params, &mut rng);
        let labels: Vec<Health> = crowd.people.iter().map(|p| p.health).collect();
        assert_eq!(
            labels,
            [Health::Infected, Health::Infected, Health::Susceptible]
        );
    }

    #[test]
    fn click_infects_nearest_susceptible_only_within_reach() {
        let params = SpreadParams::default();
        let mut crowd = Crowd {
            people: vec![
                person(100.0, 100.0, Health::Recovered),
                person(112.0, 100.0, Health::Susceptible),
                person(106.0, 100.0, Health::Susceptible),
            ],
        };
        assert!(SpatialSpread.interact(
            &mut crowd,
            &params,
            SpreadAction::InfectNear { x: 100.0, y: 100.0 }
        ));
        assert_eq!(crowd.people[2].health, Health::Infected);
        assert_eq!(crowd.people[1].health, Health::Susceptible);

        assert!(!SpatialSpread.interact(
            &mut crowd,
            &params,
            SpreadAction::InfectNear { x: 400.0, y: 300.0 }
        ));
    }

    #[test]
    fn finishes_once_infection_has_burned_out() {
        let params = SpreadParams::default();
        let crowd = Crowd {
            people: vec![person(50.0, 50.0, Health::Recovered)],
        };
        assert!(SpatialSpread.is_finished(&crowd, &params));
        let fresh = Crowd {
            people: vec![person(50.0, 50.0, Health::Susceptible)],
        };
        assert!(!SpatialSpread.is_finished(&fresh, &params));
    }
}
