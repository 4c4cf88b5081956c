use simloop_core::{FrameView, Position, Readouts};
use simloop_models::GasDiffusion;
use simloop_models::diffusion::EntropyLevel;

use super::fit_world;
use crate::{Canvas, Scene, palette};

/// Gas particles in a box, split by a solid barrier or a dashed midline once it is gone.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffusionScene;

impl Scene<GasDiffusion> for DiffusionScene {
    fn draw(
        &mut self,
        canvas: &mut Canvas,
        view: &FrameView<'_, GasDiffusion>,
        readouts: &mut Readouts,
    ) {
        let params = view.params;
        let projection = fit_world(canvas, params.width, params.height);
        canvas.clear(palette::BACKGROUND);

        let mid_x = params.mid_x();
        let top = projection.world_to_screen(Position::new(mid_x, 0.0));
        let bottom = projection.world_to_screen(Position::new(mid_x, params.height));
        if view.state.barrier {
            let half = projection.length(params.barrier_half_width);
            canvas.fill_rect(top.0 - half, top.1, half * 2.0, bottom.1 - top.1, palette::GRID);
        } else {
            canvas.dashed_line(top, bottom, 1.0, (5.0, 5.0), palette::GRID);
        }

        for particle in &view.state.particles {
            let (x, y) = projection.world_to_screen(particle.position);
            canvas.fill_circle(x, y, projection.length(particle.radius), palette::SKY);
        }

        let (left, right) = view.state.side_counts(params);
        readouts.set("left", left);
        readouts.set("right", right);
        readouts.set("entropy", EntropyLevel::from_counts(left, right));
    }
}
