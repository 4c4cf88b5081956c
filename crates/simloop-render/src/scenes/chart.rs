use crate::{Canvas, Rgba};

/// Plot area of a time-series chart, inset from the canvas edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartFrame {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ChartFrame {
    /// Insets: 20 top and right, 30 bottom, 40 left.
    #[must_use]
    pub fn inset(canvas: &Canvas) -> Self {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        Self {
            left: 40.0,
            top: 20.0,
            width: (w - 60.0).max(1.0),
            height: (h - 50.0).max(1.0),
        }
    }

    /// Screen point for fractions along each axis; `fy = 1` is the top.
    #[must_use]
    pub fn point(&self, fx: f32, fy: f32) -> (f32, f32) {
        (
            self.left + fx * self.width,
            self.top + self.height * (1.0 - fy),
        )
    }

    /// Horizontal rule at each fraction.
    pub fn rules(&self, canvas: &mut Canvas, fractions: &[f32], color: Rgba) {
        for &fy in fractions {
            let (x0, y) = self.point(0.0, fy);
            canvas.line((x0, y), (x0 + self.width, y), 1.0, color);
        }
    }
}
