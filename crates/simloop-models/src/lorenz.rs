//! Lorenz attractor traced by two nearby starting points.

use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use simloop_core::{EngineConfig, Model, Position, StepReport};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LorenzPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl LorenzPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance in phase space.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2))
            .sqrt()
    }

    /// Forward Euler step of the Lorenz equations.
    pub fn advance(&mut self, params: &LorenzParams) {
        let dx = params.sigma * (self.y - self.x);
        let dy = self.x * (params.rho - self.z) - self.y;
        let dz = self.x * self.y - params.beta * self.z;
        self.x += dx * params.dt;
        self.y += dy * params.dt;
        self.z += dz * params.dt;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LorenzParams {
    pub sigma: f64,
    pub rho: f64,
    pub beta: f64,
    pub dt: f64,
    /// Initial `x` offset of the second point.
    pub offset: f64,
    pub show_trails: bool,
}

impl Default for LorenzParams {
    fn default() -> Self {
        Self {
            sigma: 10.0,
            rho: 28.0,
            beta: 8.0 / 3.0,
            dt: 0.005,
            offset: 0.0001,
            show_trails: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LorenzPair {
    pub points: [LorenzPoint; 2],
}

impl LorenzPair {
    #[must_use]
    pub fn separation(&self) -> f64 {
        self.points[0].distance(&self.points[1])
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LorenzAttractor;

impl Model for LorenzAttractor {
    const KIND: &'static str = "lorenz";
    const KNOB_DOCS: &'static [(&'static str, &'static str)] = &[
        ("sigma", "Prandtl number"),
        ("rho", "Rayleigh number"),
        ("beta", "geometric factor"),
        ("offset", "initial x offset of the second trajectory"),
    ];

    type State = LorenzPair;
    type Params = LorenzParams;

    fn initialize(&self, params: &LorenzParams, _rng: &mut SmallRng) -> LorenzPair {
        LorenzPair {
            points: [
                LorenzPoint::new(1.0, 1.0, 1.0),
                LorenzPoint::new(1.0 + params.offset, 1.0, 1.0),
            ],
        }
    }

    fn step(&self, state: &mut LorenzPair, params: &LorenzParams, _rng: &mut SmallRng) -> StepReport {
        for point in &mut state.points {
            point.advance(params);
        }
        StepReport::default()
    }

    /// Trails live in the x/z plane.
    fn trace(&self, state: &LorenzPair, _params: &LorenzParams, points: &mut Vec<Position>) {
        points.extend(
            state
                .points
                .iter()
                .map(|p| Position::new(p.x as f32, p.z as f32)),
        );
    }

    fn engine_defaults(&self) -> EngineConfig {
        EngineConfig {
            substeps: 5,
            trail_capacity: 1000,
            trail_every_substep: true,
            ..EngineConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn trajectories_separate_but_stay_on_the_attractor() {
        let mut rng = SmallRng::seed_from_u64(1);
        let params = LorenzParams::default();
        let mut pair = LorenzAttractor.initialize(&params, &mut rng);
        let initial = pair.separation();
        let mut widest: f64 = 0.0;
        for _ in 0..10_000 {
            LorenzAttractor.step(&mut pair, &params, &mut rng);
            widest = widest.max(pair.separation());
            for p in &pair.points {
                assert!(p.x.abs() < 40.0 && p.y.abs() < 60.0 && (-1.0..80.0).contains(&p.z));
            }
        }
        assert!(widest > initial * 1000.0, "widest separation {widest}");
    }

    #[test]
    fn origin_is_a_fixed_point() {
        let mut point = LorenzPoint::new(0.0, 0.0, 0.0);
        point.advance(&LorenzParams::default());
        assert_eq!(point, LorenzPoint::new(0.0, 0.0, 0.0));
    }
}
