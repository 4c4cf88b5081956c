//! CPU raster surface the scenes draw into.
//!
//! Shapes are alpha blended over the existing pixels. Any shape with a non-finite
//! coordinate is skipped, so a degenerate frame draws nothing instead of panicking.

use image::{Rgba as Pixel, RgbaImage};

use crate::color::Rgba;

/// RGBA8 drawing surface backed by an [`RgbaImage`].
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// Surface of at least 1×1 pixels, fully transparent.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width.max(1), height.max(1)),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Row-major RGBA bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Colour at `(x, y)`, if inside the surface.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.image
            .get_pixel_checked(x, y)
            .map(|p| Rgba::rgba(p.0[0], p.0[1], p.0[2], p.0[3]))
    }

    /// Replace the surface with a new size, clearing it.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width.max(1), height.max(1)) != self.image.dimensions() {
            *self = Self::new(width, height);
        }
    }

    pub fn clear(&mut self, color: Rgba) {
        let px = Pixel(color.to_array());
        for p in self.image.pixels_mut() {
            *p = px;
        }
    }

    fn blend(&mut self, x: i32, y: i32, color: Rgba, coverage: f32) {
        if x < 0 || y < 0 {
            return;
        }
        let Some(dst) = self.image.get_pixel_mut_checked(x as u32, y as u32) else {
            return;
        };
        let alpha = f32::from(color.a) / 255.0 * coverage.clamp(0.0, 1.0);
        if alpha.is_nan() || alpha <= 0.0 {
            return;
        }
        let src = [color.r, color.g, color.b];
        for (channel, value) in dst.0.iter_mut().zip(src) {
            let mixed = f32::from(value) * alpha + f32::from(*channel) * (1.0 - alpha);
            *channel = mixed.round().clamp(0.0, 255.0) as u8;
        }
        let dst_alpha = f32::from(dst.0[3]) / 255.0;
        dst.0[3] = ((alpha + dst_alpha * (1.0 - alpha)) * 255.0).round() as u8;
    }

    /// Pixel bounds `[x0, x1] × [y0, y1]` clipped to the surface, or `None` when empty.
    fn clip(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> Option<(i32, i32, i32, i32)> {
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
            return None;
        }
        let max_x = self.width() as i32 - 1;
        let max_y = self.height() as i32 - 1;
        let bounds = (
            (x0.floor() as i32).max(0),
            (y0.floor() as i32).max(0),
            (x1.ceil() as i32).min(max_x),
            (y1.ceil() as i32).min(max_y),
        );
        (bounds.0 <= bounds.2 && bounds.1 <= bounds.3).then_some(bounds)
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, x + width - 1.0, y + height - 1.0) else {
            return;
        };
        for py in y0..=y1 {
            for px in x0..=x1 {
                self.blend(px, py, color, 1.0);
            }
        }
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        if !radius.is_finite() || radius <= 0.0 {
            return;
        }
        let Some((x0, y0, x1, y1)) =
            self.clip(cx - radius, cy - radius, cx + radius, cy + radius)
        else {
            return;
        };
        for py in y0..=y1 {
            for px in x0..=x1 {
                let d = ((px as f32 + 0.5 - cx).powi(2) + (py as f32 + 0.5 - cy).powi(2)).sqrt();
                self.blend(px, py, color, radius + 0.5 - d);
            }
        }
    }

    /// Circle outline of the given stroke width.
    pub fn stroke_circle(&mut self, cx: f32, cy: f32, radius: f32, width: f32, color: Rgba) {
        self.stroke_arc(cx, cy, radius, 0.0, std::f32::consts::TAU, width, color);
    }

    /// Arc from `start` sweeping `sweep` radians clockwise on screen (y down), as a
    /// canvas `arc` call draws it.
    #[allow(clippy::too_many_arguments)]
    pub fn stroke_arc(
        &mut self,
        cx: f32,
        cy: f32,
        radius: f32,
        start: f32,
        sweep: f32,
        width: f32,
        color: Rgba,
    ) {
        if !(radius.is_finite() && start.is_finite() && sweep.is_finite()) || radius <= 0.0 {
            return;
        }
        let half = (width / 2.0).max(0.5);
        let outer = radius + half;
        let Some((x0, y0, x1, y1)) = self.clip(cx - outer, cy - outer, cx + outer, cy + outer)
        else {
            return;
        };
        let full = sweep.abs() >= std::f32::consts::TAU;
        for py in y0..=y1 {
            for px in x0..=x1 {
                let (dx, dy) = (px as f32 + 0.5 - cx, py as f32 + 0.5 - cy);
                let d = (dx * dx + dy * dy).sqrt();
                let coverage = half + 0.5 - (d - radius).abs();
                if coverage <= 0.0 {
                    continue;
                }
                if !full {
                    let angle = (dy.atan2(dx) - start).rem_euclid(std::f32::consts::TAU);
                    if angle > sweep.max(0.0) {
                        continue;
                    }
                }
                self.blend(px, py, color, coverage);
            }
        }
    }

    /// Segment from `a` to `b` with round caps.
    pub fn line(&mut self, a: (f32, f32), b: (f32, f32), width: f32, color: Rgba) {
        if !(a.0.is_finite() && a.1.is_finite() && b.0.is_finite() && b.1.is_finite()) {
            return;
        }
        let half = (width / 2.0).max(0.5);
        let Some((x0, y0, x1, y1)) = self.clip(
            a.0.min(b.0) - half,
            a.1.min(b.1) - half,
            a.0.max(b.0) + half,
            a.1.max(b.1) + half,
        ) else {
            return;
        };
        let (ex, ey) = (b.0 - a.0, b.1 - a.1);
        let len_sq = ex * ex + ey * ey;
        for py in y0..=y1 {
            for px in x0..=x1 {
                let (qx, qy) = (px as f32 + 0.5 - a.0, py as f32 + 0.5 - a.1);
                let t = if len_sq > 0.0 {
                    ((qx * ex + qy * ey) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let d = ((qx - t * ex).powi(2) + (qy - t * ey).powi(2)).sqrt();
                self.blend(px, py, color, half + 0.5 - d);
            }
        }
    }

    /// Connected segments through `points`; segments touching a non-finite point are skipped.
    pub fn polyline<I>(&mut self, points: I, width: f32, color: Rgba)
    where
        I: IntoIterator<Item = (f32, f32)>,
    {
        let mut previous: Option<(f32, f32)> = None;
        for point in points {
            if let Some(prev) = previous {
                self.line(prev, point, width, color);
            }
            previous = Some(point);
        }
    }

    /// Dashed segment alternating `dash` drawn and `gap` skipped pixels.
    pub fn dashed_line(
        &mut self,
        a: (f32, f32),
        b: (f32, f32),
        width: f32,
        (dash, gap): (f32, f32),
        color: Rgba,
    ) {
        let (ex, ey) = (b.0 - a.0, b.1 - a.1);
        let len = (ex * ex + ey * ey).sqrt();
        if !len.is_finite() || len == 0.0 || dash <= 0.0 {
            return;
        }
        let period = dash + gap.max(0.0);
        let mut offset = 0.0;
        while offset < len {
            let end = (offset + dash).min(len);
            let start_pt = (a.0 + ex * offset / len, a.1 + ey * offset / len);
            let end_pt = (a.0 + ex * end / len, a.1 + ey * end / len);
            self.line(start_pt, end_pt, width, color);
            offset += period;
        }
    }
}
