//! Two double pendulums started a fraction of a degree apart.
//!
//! World coordinates put the pivot at the origin with `y` pointing down, so a bob at
//! angle `θ` hangs at `(L sin θ, L cos θ)`.

use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use simloop_core::{EngineConfig, Model, Position, StepReport};

/// Angles and angular velocities of one double pendulum, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendulumState {
    pub theta1: f64,
    pub theta2: f64,
    pub omega1: f64,
    pub omega2: f64,
}

impl PendulumState {
    /// Pendulum released from rest at the given angles.
    #[must_use]
    pub const fn at_rest(theta1: f64, theta2: f64) -> Self {
        Self {
            theta1,
            theta2,
            omega1: 0.0,
            omega2: 0.0,
        }
    }

    /// Positions of the two bobs relative to the pivot.
    #[must_use]
    pub fn joints(&self, params: &PendulumParams) -> (Position, Position) {
        let x1 = params.length1 * self.theta1.sin();
        let y1 = params.length1 * self.theta1.cos();
        let x2 = x1 + params.length2 * self.theta2.sin();
        let y2 = y1 + params.length2 * self.theta2.cos();
        (
            Position::new(x1 as f32, y1 as f32),
            Position::new(x2 as f32, y2 as f32),
        )
    }

    /// Sum of absolute angle differences to `other`.
    #[must_use]
    pub fn angular_distance(&self, other: &Self) -> f64 {
        (self.theta1 - other.theta1).abs() + (self.theta2 - other.theta2).abs()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendulumParams {
    pub gravity: f64,
    pub length1: f64,
    pub length2: f64,
    pub mass1: f64,
    pub mass2: f64,
    pub dt: f64,
    /// Multiplier applied to both angular velocities after every step.
    pub damping: f64,
    /// Initial upper arm angle, degrees.
    pub theta1_deg: f64,
    /// Initial lower arm angle, degrees.
    pub theta2_deg: f64,
    /// Offset added to the second pendulum's upper arm angle, degrees.
    pub perturbation_deg: f64,
    pub show_trails: bool,
}

impl Default for PendulumParams {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            length1: 100.0,
            length2: 100.0,
            mass1: 10.0,
            mass2: 10.0,
            dt: 0.05,
            damping: 0.9999,
            theta1_deg: 90.0,
            theta2_deg: 90.0,
            perturbation_deg: 0.1,
            show_trails: true,
        }
    }
}

/// Advance one pendulum by a semi-implicit Euler step.
///
/// The denominators vanish only for degenerate masses or lengths; such inputs produce
/// non-finite angles rather than an error.
pub fn integrate(state: &mut PendulumState, params: &PendulumParams) {
    let PendulumParams {
        gravity: g,
        length1: l1,
        length2: l2,
        mass1: m1,
        mass2: m2,
        dt,
        damping,
        ..
    } = *params;

    let delta = state.theta2 - state.theta1;
    let (sin_d, cos_d) = delta.sin_cos();
    let total = m1 + m2;

    let den1 = total * l1 - m2 * l1 * cos_d * cos_d;
    let den2 = (l2 / l1) * den1;

    let alpha1 = (m2 * l1 * state.omega1 * state.omega1 * sin_d * cos_d
        + m2 * g * state.theta2.sin() * cos_d
        + m2 * l2 * state.omega2 * state.omega2 * sin_d
        - total * g * state.theta1.sin())
        / den1;
    let alpha2 = (-m2 * l2 * state.omega2 * state.omega2 * sin_d * cos_d
        + total * g * state.theta1.sin() * cos_d
        - total * l1 * state.omega1 * state.omega1 * sin_d
        - total * g * state.theta2.sin())
        / den2;

    state.omega1 += alpha1 * dt;
    state.omega2 += alpha2 * dt;
    state.theta1 += state.omega1 * dt;
    state.theta2 += state.omega2 * dt;
    state.omega1 *= damping;
    state.omega2 *= damping;
}

/// The pair shown side by side: reference and perturbed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendulumPair {
    pub pendulums: [PendulumState; 2],
}

impl PendulumPair {
    /// Angular distance between the reference and the perturbed pendulum.
    #[must_use]
    pub fn divergence(&self) -> f64 {
        self.pendulums[0].angular_distance(&self.pendulums[1])
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DoublePendulum;

impl Model for DoublePendulum {
    const KIND: &'static str = "pendulum";
    const KNOB_DOCS: &'static [(&'static str, &'static str)] = &[
        ("gravity", "gravitational acceleration"),
        ("damping", "angular velocity multiplier per step"),
        ("perturbation_deg", "initial offset of the second pendulum, degrees"),
        ("show_trails", "draw the lower bob trails"),
    ];

    type State = PendulumPair;
    type Params = PendulumParams;

    fn initialize(&self, params: &PendulumParams, _rng: &mut SmallRng) -> PendulumPair {
        let theta1 = params.theta1_deg.to_radians();
        let theta2 = params.theta2_deg.to_radians();
        PendulumPair {
            pendulums: [
                PendulumState::at_rest(theta1, theta2),
                PendulumState::at_rest(theta1 + params.perturbation_deg.to_radians(), theta2),
            ],
        }
    }

    fn step(
        &self,
        state: &mut PendulumPair,
        params: &PendulumParams,
        _rng: &mut SmallRng,
    ) -> StepReport {
        for pendulum in &mut state.pendulums {
            integrate(pendulum, params);
        }
        StepReport::default()
    }

    fn trace(&self, state: &PendulumPair, params: &PendulumParams, points: &mut Vec<Position>) {
        points.extend(state.pendulums.iter().map(|p| p.joints(params).1));
    }

    fn engine_defaults(&self) -> EngineConfig {
        EngineConfig {
            substeps: 3,
            trail_capacity: 500,
            trail_every_substep: false,
            ..EngineConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn hanging_pendulum_stays_at_rest() {
        let params = PendulumParams::default();
        let mut state = PendulumState::at_rest(0.0, 0.0);
        for _ in 0..100 {
            integrate(&mut state, &params);
        }
        assert_eq!(state, PendulumState::at_rest(0.0, 0.0));
    }

    #[test]
    fn released_pendulum_swings_toward_the_bottom() {
        let params = PendulumParams::default();
        let mut state = PendulumState::at_rest(0.5, 0.5);
        integrate(&mut state, &params);
        assert!(state.omega1 < 0.0, "upper arm accelerates back: {state:?}");
        assert!(state.theta1 < 0.5);
    }

    #[test]
    fn joints_follow_arm_lengths() {
        let params = PendulumParams::default();
        let (upper, lower) = PendulumState::at_rest(0.0, std::f64::consts::FRAC_PI_2).joints(&params);
        assert_eq!(upper, Position::new(0.0, 100.0));
        assert!((lower.x - 100.0).abs() < 1e-4);
        assert!((lower.y - 100.0).abs() < 1e-4);
    }

    #[test]
    fn initial_pair_differs_only_by_the_perturbation() {
        let mut rng = SmallRng::seed_from_u64(0);
        let params = PendulumParams::default();
        let pair = DoublePendulum.initialize(&params, &mut rng);
        let expected = 0.1_f64.to_radians();
        assert!((pair.divergence() - expected).abs() < 1e-12);

        let mut trail = Vec::new();
        DoublePendulum.trace(&pair, &params, &mut trail);
        assert_eq!(trail.len(), 2);
    }
}
