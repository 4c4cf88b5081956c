use simloop_core::{FrameView, Position, Readouts};
use simloop_models::LorenzAttractor;

use crate::{Canvas, Projection, Scene, palette};

/// Pixels per world unit of the x–z projection.
const SCALE: f32 = 5.0;

/// The attractor's x–z plane on a dark background, centred on z = 25.
#[derive(Debug, Clone, Copy, Default)]
pub struct LorenzScene;

impl Scene<LorenzAttractor> for LorenzScene {
    fn draw(
        &mut self,
        canvas: &mut Canvas,
        view: &FrameView<'_, LorenzAttractor>,
        readouts: &mut Readouts,
    ) {
        let centre = (canvas.width() as f32 / 2.0, canvas.height() as f32 / 2.0);
        let projection = Projection::new(centre, Position::new(0.0, 25.0), SCALE).flipped_y();
        canvas.clear(palette::NIGHT);

        let colors = [palette::LIGHT_BLUE, palette::LIGHT_RED];
        for (point, color) in view.state.points.iter().zip(colors) {
            let head = projection.world_to_screen(Position::new(point.x as f32, point.z as f32));
            canvas.fill_circle(head.0, head.1, 4.0, color);
        }
        if view.params.show_trails {
            for (trail, color) in view.trails.iter().zip(colors) {
                canvas.polyline(trail.iter().map(|p| projection.world_to_screen(p)), 1.5, color);
            }
        }

        readouts.set("separation", format!("{:.4}", view.state.separation()));
    }
}
