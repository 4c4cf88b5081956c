use simloop_core::{FrameView, Readouts};
use simloop_models::GeneticDrift;

use super::{ChartFrame, percent};
use crate::{Canvas, Scene, palette};

/// Allele frequency of the small and large populations against generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriftScene;

impl Scene<GeneticDrift> for DriftScene {
    fn draw(
        &mut self,
        canvas: &mut Canvas,
        view: &FrameView<'_, GeneticDrift>,
        readouts: &mut Readouts,
    ) {
        let frame = ChartFrame::inset(canvas);
        canvas.clear(palette::BACKGROUND);
        frame.rules(canvas, &[0.0, 1.0], palette::GRID);
        let half_left = frame.point(0.0, 0.5);
        let half_right = frame.point(1.0, 0.5);
        canvas.dashed_line(half_left, half_right, 1.0, (5.0, 5.0), palette::MUTED);

        let span = view.params.max_generations.max(1) as f32;
        for (trail, color) in view.trails.iter().zip([palette::PURPLE, palette::SKY]) {
            if trail.len() < 2 {
                continue;
            }
            canvas.polyline(trail.iter().map(|p| frame.point(p.x / span, p.y)), 2.0, color);
        }

        readouts.set("small", percent(view.state.small));
        readouts.set("large", percent(view.state.large));
        readouts.set("generation", view.state.generation);
    }
}
