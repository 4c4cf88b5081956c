use simloop_core::{FrameView, Readouts};
use simloop_models::SirOde;

use super::{ChartFrame, percent};
use crate::{Canvas, Scene, palette};

/// S, I and R curves over elapsed time, stretched to the chart width.
#[derive(Debug, Clone, Copy, Default)]
pub struct SirScene;

impl Scene<SirOde> for SirScene {
    fn draw(&mut self, canvas: &mut Canvas, view: &FrameView<'_, SirOde>, readouts: &mut Readouts) {
        let frame = ChartFrame::inset(canvas);
        canvas.clear(palette::BACKGROUND);
        frame.rules(canvas, &[1.0, 0.75, 0.5, 0.25, 0.0], palette::GRID);

        let colors = [palette::SKY, palette::RED, palette::GREEN];
        for (trail, color) in view.trails.iter().zip(colors) {
            let (Some(first), Some(last)) = (trail.iter().next(), trail.last()) else {
                continue;
            };
            let span = last.x - first.x;
            if trail.len() < 2 || span <= 0.0 {
                continue;
            }
            canvas.polyline(
                trail.iter().map(|p| frame.point((p.x - first.x) / span, p.y)),
                2.0,
                color,
            );
        }

        let state = view.state;
        readouts.set("susceptible", percent(state.susceptible));
        readouts.set("infected", percent(state.infected));
        readouts.set("recovered", percent(state.recovered));
        readouts.set("r0", format!("{:.1}", view.params.r0()));
        readouts.set("peak", percent(state.peak_infected));
        readouts.set("total", percent(state.total_infected()));
    }
}
