use simloop_core::{FrameView, Readouts};
use simloop_models::{Health, SpatialSpread};

use super::fit_world;
use crate::{Canvas, Scene, palette};

const PERSON_RADIUS: f32 = 5.0;

/// Moving people coloured by health, with a contact ring around each spreader.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadScene;

impl Scene<SpatialSpread> for SpreadScene {
    fn draw(
        &mut self,
        canvas: &mut Canvas,
        view: &FrameView<'_, SpatialSpread>,
        readouts: &mut Readouts,
    ) {
        let params = view.params;
        let projection = fit_world(canvas, params.width, params.height);
        canvas.clear(palette::BACKGROUND);

        let ring = palette::RED.with_alpha(0.25);
        for person in &view.state.people {
            let (x, y) = projection.world_to_screen(person.position);
            let color = match person.health {
                Health::Susceptible => palette::SKY,
                Health::Infected => palette::RED,
                Health::Recovered => palette::GREEN,
            };
            canvas.fill_circle(x, y, projection.length(PERSON_RADIUS), color);
            if person.health == Health::Infected {
                canvas.stroke_circle(x, y, projection.length(params.contact_radius), 1.0, ring);
            }
        }

        let counts = view.state.counts();
        readouts.set("susceptible", counts.susceptible);
        readouts.set("infected", counts.infected);
        readouts.set("recovered", counts.recovered);
    }
}
