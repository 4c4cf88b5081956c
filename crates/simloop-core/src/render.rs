//! Presentation contract: renderers see a read-only view of each frame.

use crate::{Generation, Lifecycle, Model, Readouts, Tick, TrailSet};

/// Everything a renderer may read for one frame.
pub struct FrameView<'a, M: Model> {
    pub state: &'a M::State,
    pub params: &'a M::Params,
    pub trails: &'a TrailSet,
    pub lifecycle: Lifecycle,
    pub steps: Tick,
    pub generation: Generation,
}

/// Draws frames for model `M` and derives its readouts.
pub trait Renderer<M: Model> {
    fn render(&mut self, view: &FrameView<'_, M>, readouts: &mut Readouts);
}

/// Renderer that draws nothing; for headless stepping and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl<M: Model> Renderer<M> for NullRenderer {
    fn render(&mut self, _view: &FrameView<'_, M>, _readouts: &mut Readouts) {}
}
