//! Logistic map: a single orbit and the bifurcation diagram.

use simloop_models::logistic::{self, BIFURCATION_RANGE};

use crate::{Canvas, palette};

const PADDING: f32 = 40.0;
/// Trailing iterations marked with a dot.
const MARKED: usize = 20;

/// Population over iterations for one growth rate.
pub fn draw_orbit(canvas: &mut Canvas, values: &[f64]) {
    canvas.clear(palette::BACKGROUND);
    let (w, h) = (canvas.width() as f32, canvas.height() as f32);
    let chart_w = (w - PADDING * 2.0).max(1.0);
    let chart_h = (h - PADDING * 2.0).max(1.0);
    canvas.polyline(
        [(PADDING, PADDING), (PADDING, h - PADDING), (w - PADDING, h - PADDING)],
        1.0,
        palette::GRID,
    );

    let len = values.len().max(1) as f32;
    let point = |i: usize, v: f64| {
        (
            PADDING + (i as f32 / len) * chart_w,
            h - PADDING - v as f32 * chart_h,
        )
    };
    canvas.polyline(
        values.iter().enumerate().map(|(i, &v)| point(i, v)),
        2.0,
        palette::BLUE,
    );
    for (i, &v) in values.iter().enumerate().skip(values.len().saturating_sub(MARKED)) {
        let (x, y) = point(i, v);
        canvas.fill_circle(x, y, 3.0, palette::BLUE);
    }
}

/// One pixel column per growth rate across [`BIFURCATION_RANGE`].
pub fn draw_bifurcation(canvas: &mut Canvas) {
    canvas.clear(palette::BACKGROUND);
    let (w, h) = (canvas.width() as f32, canvas.height() as f32);
    let (r_min, r_max) = BIFURCATION_RANGE;
    let ink = palette::BLUE.with_alpha(0.6);
    for (r, x) in logistic::bifurcation(canvas.width() as usize, 100, 100) {
        let px = ((r - r_min) / (r_max - r_min)) as f32 * w;
        let py = h - x as f32 * h;
        canvas.fill_rect(px.floor(), py.floor(), 1.0, 1.0, ink);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chaotic_side_is_denser_than_stable_side() {
        let mut canvas = Canvas::new(150, 100);
        draw_bifurcation(&mut canvas);
        let inked = |columns: std::ops::Range<u32>| {
            columns
                .flat_map(|x| (0..100).map(move |y| (x, y)))
                .filter(|&(x, y)| canvas.pixel(x, y) != Some(palette::BACKGROUND))
                .count()
        };
        // r = 2.5 settles on one value; r near 4 fills most of each column.
        assert!(inked(0..1) <= 2);
        assert!(inked(140..150) > 200);
    }

    #[test]
    fn orbit_marks_the_tail() {
        let mut canvas = Canvas::new(200, 200);
        draw_orbit(&mut canvas, &logistic::orbit(2.8, 0.5, 100));
        assert!(canvas.pixels().chunks(4).any(|px| px == palette::BLUE.to_array()));
    }
}
