use simloop_core::{FrameView, Position, Readouts};
use simloop_models::DoublePendulum;

use crate::{Canvas, Projection, Scene, palette};

const ARM_COLORS: [crate::Rgba; 2] = [palette::BLUE, palette::RED];

/// Two double pendulums hanging from a shared pivot above the canvas centre.
#[derive(Debug, Clone, Copy, Default)]
pub struct PendulumScene;

impl PendulumScene {
    fn projection(canvas: &Canvas, reach: f32) -> Projection {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let pivot_y = h / 2.0 - 30.0;
        let scale = if reach > 0.0 {
            ((h - pivot_y - 8.0) / reach).min(1.0)
        } else {
            1.0
        };
        Projection::new((w / 2.0, pivot_y), Position::new(0.0, 0.0), scale.max(0.05))
    }
}

impl Scene<DoublePendulum> for PendulumScene {
    fn draw(
        &mut self,
        canvas: &mut Canvas,
        view: &FrameView<'_, DoublePendulum>,
        readouts: &mut Readouts,
    ) {
        let params = view.params;
        let projection = Self::projection(canvas, (params.length1 + params.length2) as f32);
        canvas.clear(palette::BACKGROUND);

        if params.show_trails {
            for (trail, color) in view.trails.iter().zip(ARM_COLORS) {
                canvas.polyline(
                    trail.iter().map(|p| projection.world_to_screen(p)),
                    2.0,
                    color.with_alpha(0.4),
                );
            }
        }

        let pivot = projection.world_to_screen(Position::new(0.0, 0.0));
        for (pendulum, color) in view.state.pendulums.iter().zip(ARM_COLORS) {
            let (elbow, bob) = pendulum.joints(params);
            let elbow = projection.world_to_screen(elbow);
            let bob = projection.world_to_screen(bob);
            canvas.polyline([pivot, elbow, bob], 3.0, color);
            canvas.fill_circle(elbow.0, elbow.1, 6.0, color);
            canvas.fill_circle(bob.0, bob.1, 8.0, color);
        }
        canvas.fill_circle(pivot.0, pivot.1, 5.0, palette::INK);

        readouts.set(
            "divergence",
            format!("{:.2}°", view.state.divergence().to_degrees()),
        );
    }
}
