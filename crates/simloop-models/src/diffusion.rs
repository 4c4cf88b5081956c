//! Gas particles released from the left half of a box once a central barrier is lifted.

use std::fmt;

use rand::{Rng, rngs::SmallRng};
use serde::{Deserialize, Serialize};
use simloop_core::{Interactive, Model, Position, StepReport, Velocity};
use tracing::info;

use crate::jitter_velocity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub position: Position,
    pub velocity: Velocity,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasBox {
    pub particles: Vec<Particle>,
    pub barrier: bool,
}

/// How evenly the particles are split between the halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntropyLevel {
    Low,
    Medium,
    High,
    Maximum,
}

impl EntropyLevel {
    /// Classify from per-side particle counts.
    #[must_use]
    pub fn from_counts(left: usize, right: usize) -> Self {
        let ratio = left.min(right) as f32 / left.max(right).max(1) as f32;
        if ratio < 0.1 {
            Self::Low
        } else if ratio < 0.4 {
            Self::Medium
        } else if ratio < 0.8 {
            Self::High
        } else {
            Self::Maximum
        }
    }
}

impl fmt::Display for EntropyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Maximum => "Maximum",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffusionParams {
    pub width: f32,
    pub height: f32,
    pub particles: usize,
    /// Span of the initial per-axis velocity.
    pub speed: f32,
    pub particle_radius: f32,
    pub barrier_half_width: f32,
}

impl Default for DiffusionParams {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 300.0,
            particles: 100,
            speed: 4.0,
            particle_radius: 4.0,
            barrier_half_width: 3.0,
        }
    }
}

impl DiffusionParams {
    #[must_use]
    pub fn mid_x(&self) -> f32 {
        self.width / 2.0
    }
}

impl GasBox {
    /// Particles left and right of the centre line.
    #[must_use]
    pub fn side_counts(&self, params: &DiffusionParams) -> (usize, usize) {
        let mid = params.mid_x();
        let left = self
            .particles
            .iter()
            .filter(|p| p.position.x < mid)
            .count();
        (left, self.particles.len() - left)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffusionAction {
    RemoveBarrier,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GasDiffusion;

impl GasDiffusion {
    fn bounce_walls(p: &mut Particle, params: &DiffusionParams) {
        let r = p.radius;
        if p.position.x - r < 0.0 || p.position.x + r > params.width {
            p.velocity.vx = -p.velocity.vx;
            p.position.x = p.position.x.clamp(r, (params.width - r).max(r));
        }
        if p.position.y - r < 0.0 || p.position.y + r > params.height {
            p.velocity.vy = -p.velocity.vy;
            p.position.y = p.position.y.clamp(r, (params.height - r).max(r));
        }
    }

    fn bounce_barrier(p: &mut Particle, params: &DiffusionParams) {
        let mid = params.mid_x();
        let half = params.barrier_half_width;
        let r = p.radius;
        if p.position.x + r > mid - half && p.position.x - r < mid + half {
            if p.velocity.vx > 0.0 && p.position.x < mid {
                p.position.x = mid - half - r;
                p.velocity.vx = -p.velocity.vx;
            } else if p.velocity.vx < 0.0 && p.position.x > mid {
                p.position.x = mid + half + r;
                p.velocity.vx = -p.velocity.vx;
            }
        }
    }
}

impl Model for GasDiffusion {
    const KIND: &'static str = "diffusion";
    const KNOB_DOCS: &'static [(&'static str, &'static str)] = &[
        ("particles", "particles created on reset"),
        ("speed", "initial velocity span"),
    ];

    type State = GasBox;
    type Params = DiffusionParams;

    fn initialize(&self, params: &DiffusionParams, rng: &mut SmallRng) -> GasBox {
        let particles = (0..params.particles)
            .map(|_| Particle {
                position: Position::new(
                    rng.random::<f32>() * (params.mid_x() - 20.0).max(0.0) + 10.0,
                    rng.random::<f32>() * (params.height - 20.0).max(0.0) + 10.0,
                ),
                velocity: jitter_velocity(rng, params.speed),
                radius: params.particle_radius,
            })
            .collect();
        GasBox {
            particles,
            barrier: true,
        }
    }

    fn step(&self, state: &mut GasBox, params: &DiffusionParams, _rng: &mut SmallRng) -> StepReport {
        for p in &mut state.particles {
            p.position.x += p.velocity.vx;
            p.position.y += p.velocity.vy;
            Self::bounce_walls(p, params);
            if state.barrier {
                Self::bounce_barrier(p, params);
            }
        }
        StepReport::default()
    }
}

impl Interactive for GasDiffusion {
    type Action = DiffusionAction;

    fn interact(&self, state: &mut GasBox, _params: &DiffusionParams, action: DiffusionAction) -> bool {
        match action {
            DiffusionAction::RemoveBarrier if state.barrier => {
                state.barrier = false;
                info!("barrier removed");
                true
            }
            DiffusionAction::RemoveBarrier => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn entropy_levels_follow_the_side_ratio() {
        assert_eq!(EntropyLevel::from_counts(100, 0), EntropyLevel::Low);
        assert_eq!(EntropyLevel::from_counts(80, 20), EntropyLevel::Medium);
        assert_eq!(EntropyLevel::from_counts(60, 40), EntropyLevel::High);
        assert_eq!(EntropyLevel::from_counts(50, 50), EntropyLevel::Maximum);
        assert_eq!(EntropyLevel::from_counts(0, 0), EntropyLevel::Low);
        assert_eq!(EntropyLevel::Maximum.to_string(), "Maximum");
    }

    #[test]
    fn barrier_confines_particles_to_the_left() {
        let params = DiffusionParams::default();
        let mut rng = SmallRng::seed_from_u64(8);
        let mut gas = GasDiffusion.initialize(&params, &mut rng);
        assert_eq!(gas.side_counts(&params), (100, 0));
        for _ in 0..2_000 {
            GasDiffusion.step(&mut gas, &params, &mut rng);
        }
        assert_eq!(gas.side_counts(&params), (100, 0));
    }

    #[test]
    fn removing_the_barrier_lets_gas_spread() {
        let params = DiffusionParams::default();
        let mut rng = SmallRng::seed_from_u64(8);
        let mut gas = GasDiffusion.initialize(&params, &mut rng);
        assert!(GasDiffusion.interact(&mut gas, &params, DiffusionAction::RemoveBarrier));
        assert!(!GasDiffusion.interact(&mut gas, &params, DiffusionAction::RemoveBarrier));
        for _ in 0..2_000 {
            GasDiffusion.step(&mut gas, &params, &mut rng);
        }
        let (_, right) = gas.side_counts(&params);
        assert!(right > 10, "only {right} particles crossed");
    }
}
