//! Renderer strategy: one [`Scene`] per demo drawing into a shared [`Canvas`].

use simloop_core::{FrameView, Model, Readouts, Renderer};

use crate::Canvas;

/// Draws one demo's frame and fills its readouts.
pub trait Scene<M: Model> {
    fn draw(&mut self, canvas: &mut Canvas, view: &FrameView<'_, M>, readouts: &mut Readouts);
}

/// [`Renderer`] that owns the drawing surface and delegates to a scene.
#[derive(Debug, Clone)]
pub struct SceneRenderer<S> {
    canvas: Canvas,
    scene: S,
    frames: u64,
}

impl<S> SceneRenderer<S> {
    #[must_use]
    pub fn new(canvas: Canvas, scene: S) -> Self {
        Self {
            canvas,
            scene,
            frames: 0,
        }
    }

    #[must_use]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Resize the surface; takes effect on the next render.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.resize(width, height);
    }

    #[must_use]
    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Frames drawn so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl<M, S> Renderer<M> for SceneRenderer<S>
where
    M: Model,
    S: Scene<M>,
{
    fn render(&mut self, view: &FrameView<'_, M>, readouts: &mut Readouts) {
        self.scene.draw(&mut self.canvas, view, readouts);
        self.frames += 1;
    }
}
