use simloop_core::{FrameView, Lifecycle, Readouts};
use simloop_models::HeatTransfer;

use crate::{Canvas, Rgba, Scene, palette};

/// Blue at 0 °C through to red at 100 °C; temperatures outside are clamped.
#[must_use]
pub fn temperature_color(celsius: f64) -> Rgba {
    let t = celsius.clamp(0.0, 100.0) / 100.0;
    let channel = |cold: f64, hot: f64| (cold + (hot - cold) * t).round() as u8;
    Rgba::rgb(channel(59.0, 239.0), channel(130.0, 68.0), channel(246.0, 68.0))
}

fn celsius(value: f64) -> String {
    format!("{}°C", value.round() as i64)
}

/// Two blocks in contact, each coloured by its temperature.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeatScene;

impl Scene<HeatTransfer> for HeatScene {
    fn draw(
        &mut self,
        canvas: &mut Canvas,
        view: &FrameView<'_, HeatTransfer>,
        readouts: &mut Readouts,
    ) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        canvas.clear(palette::BACKGROUND);

        let side = (w / 3.0).min(h * 0.6).max(1.0);
        let top = (h - side) / 2.0;
        let left = w / 2.0 - side;
        let bodies = view.state;
        canvas.fill_rect(left, top, side, side, temperature_color(bodies.hot));
        canvas.fill_rect(w / 2.0, top, side, side, temperature_color(bodies.cold));
        canvas.line((w / 2.0, top), (w / 2.0, top + side), 2.0, palette::INK);

        // Strip below the blocks in the colour both will settle at.
        let target = view.params.equilibrium();
        canvas.fill_rect(left, top + side + 12.0, side * 2.0, 8.0, temperature_color(target));

        readouts.set("hot", celsius(bodies.hot));
        readouts.set("cold", celsius(bodies.cold));
        readouts.set("final", celsius(target));
        readouts.set(
            "status",
            match view.lifecycle {
                Lifecycle::Idle => "Ready",
                Lifecycle::Running => "Transferring...",
                Lifecycle::Paused => "Paused",
                Lifecycle::Finished => "Equilibrium reached!",
            },
        );
    }
}
