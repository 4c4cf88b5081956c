//! Core types shared across the simloop workspace.
//!
//! An [`Engine`] owns one simulation: a [`StateStore`] holding the state produced by a
//! [`Model`], the [`TrailSet`] kept for visual traces, and a [`Renderer`] that draws each
//! accepted frame. Hosts drive it with [`FrameToken`]s handed out by `start` and `on_frame`.

use rand::{SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod clock;
pub mod engine;
pub mod knobs;
pub mod model;
pub mod readouts;
pub mod render;
pub mod store;
pub mod trail;

pub use clock::{FrameToken, ManualFrameClock};
pub use engine::{Engine, FrameCommand, Lifecycle};
pub use knobs::{KnobEntry, KnobError, KnobKind, KnobUpdate};
pub use model::{Interactive, Model, StepReport};
pub use readouts::{Readout, Readouts};
pub use render::{FrameView, NullRenderer, Renderer};
pub use store::StateStore;
pub use trail::{TrailBuffer, TrailSet};

/// Upper bound on integrator sub-steps per accepted frame.
pub const MAX_SUBSTEPS: u32 = 64;

/// Elapsed integrator steps since the last reset.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tick(pub u64);

impl Tick {
    /// Returns the next sequential tick.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Resets the tick counter back to zero.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }
}

/// Generation boundaries crossed since the last reset.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub struct Generation(pub u32);

impl Generation {
    /// Advances to the next generation.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// 2D point in simulation (world) coordinates.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    /// Construct a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Squared euclidean distance to `other`.
    #[must_use]
    pub fn distance_sq(self, other: Self) -> f32 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    /// Whether both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f32, f32)> for Position {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Velocity in world units per step.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

impl Velocity {
    /// Construct a new velocity vector.
    #[must_use]
    pub const fn new(vx: f32, vy: f32) -> Self {
        Self { vx, vy }
    }
}

/// Per-engine loop configuration. Demo-specific knobs live in each model's parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Integrator steps executed per accepted frame.
    pub substeps: u32,
    /// Step only on every n-th accepted frame; frames in between only render.
    pub frame_stride: u32,
    /// Maximum points retained per trail.
    pub trail_capacity: usize,
    /// Record a trail point after every sub-step instead of once per frame.
    pub trail_every_substep: bool,
    /// Optional RNG seed for deterministic runs.
    pub rng_seed: Option<u64>,
    /// Hard stop after this many steps.
    pub max_steps: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            substeps: 1,
            frame_stride: 1,
            trail_capacity: 500,
            trail_every_substep: true,
            rng_seed: None,
            max_steps: None,
        }
    }
}

impl EngineConfig {
    /// Check the loop settings before an engine is built around them.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.substeps == 0 {
            return Err(EngineError::InvalidConfig("substeps must be at least 1"));
        }
        if self.substeps > MAX_SUBSTEPS {
            return Err(EngineError::InvalidConfig("substeps exceeds MAX_SUBSTEPS"));
        }
        if self.frame_stride == 0 {
            return Err(EngineError::InvalidConfig("frame_stride must be at least 1"));
        }
        if self.trail_capacity == 0 {
            return Err(EngineError::InvalidConfig(
                "trail_capacity must be greater than zero",
            ));
        }
        if self.max_steps == Some(0) {
            return Err(EngineError::InvalidConfig("max_steps must be positive when set"));
        }
        Ok(())
    }

    /// Seed used for the engine RNG, drawing a fresh one when none is configured.
    #[must_use]
    pub fn resolve_seed(&self) -> u64 {
        self.rng_seed.unwrap_or_else(rand::random)
    }

    /// Returns an RNG seeded from the configuration.
    #[must_use]
    pub fn seeded_rng(&self) -> SmallRng {
        SmallRng::seed_from_u64(self.resolve_seed())
    }
}

/// Loop settings layered over a demo's [`EngineConfig`]; unset fields keep its value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineOverrides {
    pub substeps: Option<u32>,
    pub frame_stride: Option<u32>,
    pub trail_capacity: Option<usize>,
    pub trail_every_substep: Option<bool>,
    pub rng_seed: Option<u64>,
    pub max_steps: Option<u64>,
}

impl EngineOverrides {
    #[must_use]
    pub fn apply_to(&self, base: EngineConfig) -> EngineConfig {
        EngineConfig {
            substeps: self.substeps.unwrap_or(base.substeps),
            frame_stride: self.frame_stride.unwrap_or(base.frame_stride),
            trail_capacity: self.trail_capacity.unwrap_or(base.trail_capacity),
            trail_every_substep: self
                .trail_every_substep
                .unwrap_or(base.trail_every_substep),
            rng_seed: self.rng_seed.or(base.rng_seed),
            max_steps: self.max_steps.or(base.max_steps),
        }
    }
}

/// Errors surfaced by engine construction and control.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Indicates invalid configuration values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// A lifecycle action that the current state does not allow.
    #[error("cannot {action} while {from}")]
    InvalidTransition {
        from: Lifecycle,
        action: &'static str,
    },
    /// Parameter updates that could not be applied.
    #[error(transparent)]
    Knob(#[from] KnobError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        EngineConfig::default().validate().expect("defaults validate");
    }

    #[test]
    fn rejects_zero_substeps_and_stride() {
        let config = EngineConfig {
            substeps: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig("substeps must be at least 1"))
        ));

        let config = EngineConfig {
            frame_stride: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_empty_trails_and_zero_step_budget() {
        for config in [
            EngineConfig {
                trail_capacity: 0,
                ..EngineConfig::default()
            },
            EngineConfig {
                max_steps: Some(0),
                ..EngineConfig::default()
            },
            EngineConfig {
                substeps: MAX_SUBSTEPS + 1,
                ..EngineConfig::default()
            },
        ] {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
    }

    #[test]
    fn seeded_config_resolves_to_its_seed() {
        let config = EngineConfig {
            rng_seed: Some(42),
            ..EngineConfig::default()
        };
        assert_eq!(config.resolve_seed(), 42);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"substeps": 3, "rng_seed": 9}"#).expect("parse");
        assert_eq!(config.substeps, 3);
        assert_eq!(config.rng_seed, Some(9));
        assert_eq!(config.trail_capacity, EngineConfig::default().trail_capacity);
    }

    #[test]
    fn overrides_touch_only_the_fields_they_set() {
        let base = EngineConfig {
            substeps: 5,
            frame_stride: 30,
            trail_every_substep: false,
            ..EngineConfig::default()
        };
        let overrides: EngineOverrides =
            serde_json::from_str(r#"{"rng_seed": 4, "max_steps": 100}"#).expect("parse");
        let merged = overrides.apply_to(base.clone());
        assert_eq!(merged.substeps, 5);
        assert_eq!(merged.frame_stride, 30);
        assert!(!merged.trail_every_substep);
        assert_eq!(merged.rng_seed, Some(4));
        assert_eq!(merged.max_steps, Some(100));
        assert_eq!(EngineOverrides::default().apply_to(base.clone()), base);
        assert!(serde_json::from_str::<EngineOverrides>(r#"{"substep": 2}"#).is_err());
    }

    #[test]
    fn tick_advances_by_one() {
        assert_eq!(Tick::zero().next().next(), Tick(2));
        assert_eq!(Generation::default().next(), Generation(1));
    }
}
