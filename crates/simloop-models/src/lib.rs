//! Integrators for the simloop demos.
//!
//! Each looping demo implements [`simloop_core::Model`]; demos with clickable or button
//! driven behaviour also implement [`simloop_core::Interactive`]. The satellite units
//! ([`graph`], [`herd`], [`logistic`]) are plain computations used by static widgets.

use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};
use simloop_core::{Position, Velocity};

pub mod diffusion;
pub mod drift;
pub mod evolution;
pub mod graph;
pub mod heat;
pub mod herd;
pub mod logistic;
pub mod lorenz;
pub mod pendulum;
pub mod selection;
pub mod sir;
pub mod spread;
pub mod viral;

pub use diffusion::{DiffusionAction, GasDiffusion};
pub use drift::GeneticDrift;
pub use evolution::NaturalSelection;
pub use graph::{GraphError, NodeId, ShortestPath, WeightedGraph};
pub use heat::HeatTransfer;
pub use lorenz::LorenzAttractor;
pub use pendulum::DoublePendulum;
pub use selection::{SelectionMode, TraitSelection};
pub use sir::SirOde;
pub use spread::{Health, SpatialSpread, SpreadAction};
pub use viral::{ViralAction, ViralCascade};

/// Looping demos known to the CLI and the web bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemoKind {
    Pendulum,
    Lorenz,
    Sir,
    Spread,
    Evolution,
    Diffusion,
    Viral,
    Drift,
    Selection,
    Heat,
}

impl DemoKind {
    pub const ALL: [Self; 10] = [
        Self::Pendulum,
        Self::Lorenz,
        Self::Sir,
        Self::Spread,
        Self::Evolution,
        Self::Diffusion,
        Self::Viral,
        Self::Drift,
        Self::Selection,
        Self::Heat,
    ];

    /// Identifier matching the model's `KIND`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pendulum => "pendulum",
            Self::Lorenz => "lorenz",
            Self::Sir => "sir",
            Self::Spread => "spread",
            Self::Evolution => "evolution",
            Self::Diffusion => "diffusion",
            Self::Viral => "viral",
            Self::Drift => "drift",
            Self::Selection => "selection",
            Self::Heat => "heat",
        }
    }
}

impl fmt::Display for DemoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown demo name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown demo `{0}`")]
pub struct UnknownDemo(pub String);

impl FromStr for DemoKind {
    type Err = UnknownDemo;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownDemo(s.to_owned()))
    }
}

/// Uniform point inside `[padding, extent - padding]` on both axes.
pub(crate) fn random_position<R: Rng + ?Sized>(
    rng: &mut R,
    width: f32,
    height: f32,
    padding: f32,
) -> Position {
    Position::new(
        padding + rng.random::<f32>() * (width - 2.0 * padding).max(0.0),
        padding + rng.random::<f32>() * (height - 2.0 * padding).max(0.0),
    )
}

/// Velocity with each component uniform in `[-scale / 2, scale / 2)`.
pub(crate) fn jitter_velocity<R: Rng + ?Sized>(rng: &mut R, scale: f32) -> Velocity {
    Velocity::new(
        (rng.random::<f32>() - 0.5) * scale,
        (rng.random::<f32>() - 0.5) * scale,
    )
}
