use simloop_core::{FrameView, Readouts};
use simloop_models::{SelectionMode, TraitSelection};

use crate::{Canvas, Scene, palette};

const BINS: usize = 20;
const PAD_TOP: f32 = 20.0;
const PAD_RIGHT: f32 = 20.0;
const PAD_BOTTOM: f32 = 30.0;
const PAD_LEFT: f32 = 20.0;

/// Trait histogram over a shaded band marking where selection favours.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionScene;

impl SelectionScene {
    fn pressure(canvas: &mut Canvas, mode: SelectionMode, chart: (f32, f32)) {
        let (width, height) = chart;
        match mode {
            SelectionMode::Directional => {
                // Left-to-right ramp up to a quarter opacity.
                let columns = width.ceil().max(1.0) as usize;
                for col in 0..columns {
                    let alpha = 0.25 * col as f32 / columns as f32;
                    let x = PAD_LEFT + col as f32;
                    canvas.fill_rect(x, PAD_TOP, 1.0, height, palette::PURPLE.with_alpha(alpha));
                }
            }
            SelectionMode::Stabilizing => {
                let columns = width.ceil().max(1.0) as usize;
                let shade = palette::PURPLE.with_alpha(0.125);
                for col in 0..columns {
                    let f = col as f32 / columns as f32;
                    let peak = height * (1.0 - (2.0 * f - 1.0).abs());
                    let x = PAD_LEFT + col as f32;
                    canvas.fill_rect(x, PAD_TOP + height - peak, 1.0, peak, shade);
                }
            }
            SelectionMode::Disruptive => {
                let shade = palette::PURPLE.with_alpha(0.125);
                canvas.fill_rect(PAD_LEFT, PAD_TOP, width * 0.3, height, shade);
                canvas.fill_rect(PAD_LEFT + width * 0.7, PAD_TOP, width * 0.3, height, shade);
            }
        }
    }
}

impl Scene<TraitSelection> for SelectionScene {
    fn draw(
        &mut self,
        canvas: &mut Canvas,
        view: &FrameView<'_, TraitSelection>,
        readouts: &mut Readouts,
    ) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let chart_width = (w - PAD_LEFT - PAD_RIGHT).max(1.0);
        let chart_height = (h - PAD_TOP - PAD_BOTTOM).max(1.0);
        canvas.clear(palette::BACKGROUND);
        Self::pressure(canvas, view.params.mode, (chart_width, chart_height));

        let bins = view.state.histogram(BINS);
        let tallest = bins.iter().copied().max().unwrap_or(0).max(1) as f32;
        let bar_width = chart_width / BINS as f32 - 2.0;
        for (i, &count) in bins.iter().enumerate() {
            let x = PAD_LEFT + (i as f32 / BINS as f32) * chart_width + 1.0;
            let bar_height = count as f32 / tallest * chart_height;
            let y = PAD_TOP + chart_height - bar_height;
            canvas.fill_rect(x, y, bar_width, bar_height, palette::PURPLE);
        }

        // Ticks at trait values 0, 25, 50, 75 and 100.
        let axis_y = PAD_TOP + chart_height;
        canvas.line((PAD_LEFT, axis_y), (PAD_LEFT + chart_width, axis_y), 1.0, palette::GRID);
        for tick in 0..=4 {
            let x = PAD_LEFT + tick as f32 / 4.0 * chart_width;
            canvas.line((x, axis_y), (x, axis_y + 5.0), 1.0, palette::MUTED);
        }

        readouts.set("mean", format!("{:.1}", view.state.mean()));
        readouts.set("std", format!("{:.1}", view.state.std_dev()));
        readouts.set("generation", view.state.generation);
        readouts.set("mode", view.params.mode);
        readouts.set("caption", view.params.mode.caption());
    }
}
