//! Population grid for the herd immunity calculator.

use simloop_models::herd::{GRID_CELLS, HerdAssessment};

use crate::{Canvas, palette};

const GAP: f32 = 2.0;

/// Square grid of people: vaccinated cells in green, the rest red while the
/// population is unprotected and grey once herd immunity holds.
pub fn draw_herd(canvas: &mut Canvas, cells: &[bool], assessment: &HerdAssessment) {
    canvas.clear(palette::BACKGROUND);
    let side = (GRID_CELLS as f32).sqrt().ceil().max(1.0);
    let cell_w = canvas.width() as f32 / side;
    let cell_h = canvas.height() as f32 / side;
    let exposed = if assessment.protected {
        palette::GRID
    } else {
        palette::LIGHT_RED
    };
    for (idx, &vaccinated) in cells.iter().enumerate() {
        let (col, row) = ((idx as f32) % side, (idx as f32 / side).floor());
        let color = if vaccinated { palette::GREEN } else { exposed };
        canvas.fill_rect(
            col * cell_w + GAP / 2.0,
            row * cell_h + GAP / 2.0,
            (cell_w - GAP).max(1.0),
            (cell_h - GAP).max(1.0),
            color,
        );
    }
}
