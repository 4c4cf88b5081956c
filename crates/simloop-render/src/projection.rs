//! World-to-screen mapping: a uniform scale about an anchor with optional axis flips.

use serde::{Deserialize, Serialize};
use simloop_core::Position;

/// `screen = origin + (world - anchor) * scale`, negated per flipped axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Screen point the anchor maps to.
    pub origin: (f32, f32),
    /// World point drawn at `origin`.
    pub anchor: Position,
    pub scale: f32,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Default for Projection {
    fn default() -> Self {
        Self::identity()
    }
}

impl Projection {
    /// World units are pixels.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            origin: (0.0, 0.0),
            anchor: Position::new(0.0, 0.0),
            scale: 1.0,
            flip_x: false,
            flip_y: false,
        }
    }

    #[must_use]
    pub const fn new(origin: (f32, f32), anchor: Position, scale: f32) -> Self {
        Self {
            origin,
            anchor,
            scale,
            flip_x: false,
            flip_y: false,
        }
    }

    /// Make world `y` grow upwards on screen.
    #[must_use]
    pub const fn flipped_y(self) -> Self {
        Self {
            flip_y: true,
            ..self
        }
    }

    #[must_use]
    pub const fn flipped_x(self) -> Self {
        Self {
            flip_x: true,
            ..self
        }
    }

    /// Largest uniform scale showing a `world` rectangle anchored at the origin inside
    /// `surface`, centred along the slack axis.
    #[must_use]
    pub fn fit(world: (f32, f32), surface: (f32, f32)) -> Self {
        let (world_w, world_h) = (world.0.max(f32::EPSILON), world.1.max(f32::EPSILON));
        let scale = (surface.0 / world_w).min(surface.1 / world_h);
        let pad = (
            (surface.0 - world_w * scale) * 0.5,
            (surface.1 - world_h * scale) * 0.5,
        );
        Self::new(pad, Position::new(0.0, 0.0), scale)
    }

    fn signs(&self) -> (f32, f32) {
        (
            if self.flip_x { -1.0 } else { 1.0 },
            if self.flip_y { -1.0 } else { 1.0 },
        )
    }

    #[must_use]
    pub fn world_to_screen(&self, point: Position) -> (f32, f32) {
        let (sx, sy) = self.signs();
        (
            self.origin.0 + (point.x - self.anchor.x) * self.scale * sx,
            self.origin.1 + (point.y - self.anchor.y) * self.scale * sy,
        )
    }

    /// Inverse mapping; `None` for a degenerate scale or non-finite result.
    #[must_use]
    pub fn screen_to_world(&self, x: f32, y: f32) -> Option<Position> {
        if !self.scale.is_finite() || self.scale.abs() <= f32::EPSILON {
            return None;
        }
        let (sx, sy) = self.signs();
        let world = Position::new(
            self.anchor.x + (x - self.origin.0) / (self.scale * sx),
            self.anchor.y + (y - self.origin.1) / (self.scale * sy),
        );
        world.is_finite().then_some(world)
    }

    /// World length to screen length.
    #[must_use]
    pub fn length(&self, world: f32) -> f32 {
        world * self.scale.abs()
    }
}
