//! Frame scheduling handles and a manually advanced frame clock.

use serde::{Deserialize, Serialize};

use crate::{Engine, Model, Renderer};

/// Identifies one scheduled frame callback. Only the most recently issued token is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameToken(u64);

impl FrameToken {
    pub(crate) const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw token id.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Host stand-in that delivers scheduled frame callbacks on demand.
///
/// The clock does not observe `pause` or `reset`; a token it already holds is still
/// delivered, which is how a stale callback reaches the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualFrameClock {
    pending: Option<FrameToken>,
    elapsed: u64,
    delivered: u64,
}

impl ManualFrameClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `token` for the next frame, replacing any queued callback.
    pub fn schedule(&mut self, token: FrameToken) {
        self.pending = Some(token);
    }

    /// Drop the queued callback, returning it.
    pub fn cancel(&mut self) -> Option<FrameToken> {
        self.pending.take()
    }

    #[must_use]
    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    /// Frames elapsed on this clock.
    #[must_use]
    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    /// Callbacks delivered to an engine.
    #[must_use]
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Advance one display frame, delivering the queued callback if there is one.
    /// Returns whether a callback was delivered.
    pub fn advance<M, R>(&mut self, engine: &mut Engine<M, R>) -> bool
    where
        M: Model,
        R: Renderer<M>,
    {
        self.elapsed += 1;
        let Some(token) = self.pending.take() else {
            return false;
        };
        self.delivered += 1;
        self.pending = engine.on_frame(token);
        true
    }

    /// Advance `frames` display frames; returns the number of callbacks delivered.
    pub fn advance_by<M, R>(&mut self, engine: &mut Engine<M, R>, frames: u64) -> u64
    where
        M: Model,
        R: Renderer<M>,
    {
        (0..frames).filter(|_| self.advance(engine)).count() as u64
    }
}
