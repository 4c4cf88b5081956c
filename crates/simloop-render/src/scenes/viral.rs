use simloop_core::{FrameView, Readouts};
use simloop_models::ViralCascade;

use super::fit_world;
use crate::{Canvas, Scene, palette};

const NODE_RADIUS: f32 = 8.0;

/// Network nodes and links; links between two infected nodes are highlighted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViralScene;

impl Scene<ViralCascade> for ViralScene {
    fn draw(
        &mut self,
        canvas: &mut Canvas,
        view: &FrameView<'_, ViralCascade>,
        readouts: &mut Readouts,
    ) {
        let network = view.state;
        let projection = fit_world(canvas, view.params.width, view.params.height);
        canvas.clear(palette::BACKGROUND);

        for &(a, b) in &network.edges {
            let (Some(from), Some(to)) = (network.nodes.get(a), network.nodes.get(b)) else {
                continue;
            };
            let (width, color) = if network.is_infected(a) && network.is_infected(b) {
                (2.0, palette::RED.with_alpha(0.5))
            } else {
                (1.0, palette::MUTED.with_alpha(0.3))
            };
            canvas.line(
                projection.world_to_screen(from.position),
                projection.world_to_screen(to.position),
                width,
                color,
            );
        }

        for (idx, node) in network.nodes.iter().enumerate() {
            let (x, y) = projection.world_to_screen(node.position);
            let color = if network.is_infected(idx) {
                palette::RED
            } else {
                palette::SKY
            };
            canvas.fill_circle(x, y, projection.length(NODE_RADIUS), color);
        }

        readouts.set("infected", network.infected_count());
        readouts.set("generation", network.max_round());
        let r = network
            .cascade
            .and_then(|cascade| cascade.reproduction_number())
            .map_or_else(|| "0".to_owned(), |r| format!("{r:.2}"));
        readouts.set("r", r);
    }
}
