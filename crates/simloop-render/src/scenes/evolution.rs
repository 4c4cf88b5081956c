use std::f32::consts::TAU;

use simloop_core::{FrameView, Readouts};
use simloop_models::NaturalSelection;

use super::fit_world;
use crate::{Canvas, Rgba, Scene, palette};

/// Food pellets and creatures; hue follows speed, radius follows size, and an arc
/// around each creature shows its remaining energy.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvolutionScene;

impl Scene<NaturalSelection> for EvolutionScene {
    fn draw(
        &mut self,
        canvas: &mut Canvas,
        view: &FrameView<'_, NaturalSelection>,
        readouts: &mut Readouts,
    ) {
        let params = view.params;
        let projection = fit_world(canvas, params.width, params.height);
        canvas.clear(palette::BACKGROUND);

        for food in &view.state.food {
            let (x, y) = projection.world_to_screen(*food);
            canvas.fill_circle(x, y, projection.length(4.0), palette::GREEN);
        }

        for creature in &view.state.creatures {
            let (x, y) = projection.world_to_screen(creature.position);
            let radius = projection.length(6.0 * creature.size);
            let hue = 200.0 + (creature.speed - 0.5) * 100.0;
            canvas.fill_circle(x, y, radius, Rgba::hsl(hue, 0.7, 0.5));

            let ratio = creature.energy_ratio(params.initial_energy);
            let color = if ratio > 0.5 { palette::GREEN } else { palette::RED };
            canvas.stroke_arc(x, y, radius + 2.0, 0.0, TAU * ratio, 2.0, color);
        }

        readouts.set("generation", view.generation.0);
        readouts.set("population", view.state.creatures.len());
        if let Some(averages) = view.state.averages() {
            readouts.set("avg_speed", format!("{:.2}", averages.speed));
            readouts.set("avg_size", format!("{:.2}", averages.size));
        } else {
            readouts.set("avg_speed", "-");
            readouts.set("avg_size", "-");
        }
    }
}
