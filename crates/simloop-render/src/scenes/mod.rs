//! Per-demo scenes and the drawers for the static widgets.

mod chart;
mod diffusion;
mod drift;
mod evolution;
pub mod graph;
pub mod heat;
pub mod herd;
pub mod logistic;
mod lorenz;
mod pendulum;
mod selection;
mod sir;
mod spread;
mod viral;

pub use chart::ChartFrame;
pub use diffusion::DiffusionScene;
pub use drift::DriftScene;
pub use evolution::EvolutionScene;
pub use heat::HeatScene;
pub use lorenz::LorenzScene;
pub use pendulum::PendulumScene;
pub use selection::SelectionScene;
pub use sir::SirScene;
pub use spread::SpreadScene;
pub use viral::ViralScene;

use crate::{Canvas, Projection};

/// Projection showing a `width × height` world on the whole canvas.
pub(crate) fn fit_world(canvas: &Canvas, width: f32, height: f32) -> Projection {
    Projection::fit((width, height), (canvas.width() as f32, canvas.height() as f32))
}

/// Percentage rounded to an integer, as shown next to fractions in readouts.
pub(crate) fn percent(fraction: f64) -> String {
    format!("{}%", (fraction * 100.0).round())
}
