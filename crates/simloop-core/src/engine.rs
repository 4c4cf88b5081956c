//! Lifecycle driver tying state, integrator, trails, and renderer together.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::knobs::{self, KnobEntry, KnobUpdate};
use crate::{
    EngineConfig, EngineError, FrameToken, FrameView, Generation, Interactive, Model, Position,
    Readouts, Renderer, StateStore, Tick, TrailSet,
};

/// Engine lifecycle. `Finished` is terminal until `reset`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    #[default]
    Idle,
    Running,
    Paused,
    Finished,
}

impl Lifecycle {
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    /// Label for a combined start/pause control in this state.
    #[must_use]
    pub const fn control_label(self) -> &'static str {
        match self {
            Self::Running => "Pause",
            Self::Idle | Self::Paused | Self::Finished => "Start",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Finished => "finished",
        })
    }
}

/// What the host must do with its frame scheduler after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCommand {
    /// Schedule a callback carrying this token.
    Schedule(FrameToken),
    /// Cancel the callback holding this token, if one was pending.
    Cancel(Option<FrameToken>),
}

/// One simulation instance driven frame by frame.
pub struct Engine<M: Model, R: Renderer<M>> {
    model: M,
    params: M::Params,
    config: EngineConfig,
    store: StateStore<M>,
    trails: TrailSet,
    readouts: Readouts,
    renderer: R,
    lifecycle: Lifecycle,
    steps: Tick,
    generation: Generation,
    frames: u64,
    pending: Option<FrameToken>,
    next_token: u64,
    scratch: Vec<Position>,
}

impl<M: Model, R: Renderer<M>> Engine<M, R> {
    /// Build an idle engine and render its initial frame.
    pub fn new(
        model: M,
        params: M::Params,
        config: EngineConfig,
        renderer: R,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let seed = config.resolve_seed();
        let store = StateStore::initialize(&model, &params, seed);
        let trails = TrailSet::new(config.trail_capacity);
        let mut engine = Self {
            model,
            params,
            config,
            store,
            trails,
            readouts: Readouts::new(),
            renderer,
            lifecycle: Lifecycle::Idle,
            steps: Tick::zero(),
            generation: Generation::default(),
            frames: 0,
            pending: None,
            next_token: 0,
            scratch: Vec::new(),
        };
        engine.record_trail();
        engine.render();
        debug!(kind = M::KIND, seed, "engine initialized");
        Ok(engine)
    }

    /// Build with default parameters and the model's preferred loop settings.
    pub fn with_defaults(model: M, renderer: R) -> Result<Self, EngineError> {
        let config = model.engine_defaults();
        Self::new(model, M::Params::default(), config, renderer)
    }

    /// Idle/Paused → Running. Returns the token the host must schedule.
    pub fn start(&mut self) -> Result<FrameToken, EngineError> {
        match self.lifecycle {
            Lifecycle::Idle | Lifecycle::Paused => {
                self.lifecycle = Lifecycle::Running;
                let token = self.issue_token();
                info!(kind = M::KIND, step = self.steps.0, "simulation started");
                Ok(token)
            }
            from => Err(EngineError::InvalidTransition {
                from,
                action: "start",
            }),
        }
    }

    /// Running → Paused. Returns the cancelled token, if a callback was pending.
    pub fn pause(&mut self) -> Result<Option<FrameToken>, EngineError> {
        if self.lifecycle != Lifecycle::Running {
            return Err(EngineError::InvalidTransition {
                from: self.lifecycle,
                action: "pause",
            });
        }
        self.lifecycle = Lifecycle::Paused;
        info!(kind = M::KIND, step = self.steps.0, "simulation paused");
        Ok(self.pending.take())
    }

    /// Pause when running, start otherwise.
    pub fn toggle(&mut self) -> Result<FrameCommand, EngineError> {
        if self.lifecycle.is_running() {
            self.pause().map(FrameCommand::Cancel)
        } else {
            self.start().map(FrameCommand::Schedule)
        }
    }

    /// Any state → Idle with a freshly initialized state, empty trails, and zeroed counters.
    /// Returns the cancelled token, if a callback was pending.
    pub fn reset(&mut self) -> Option<FrameToken> {
        self.store.reset(&self.model, &self.params);
        self.restart_lifecycle()
    }

    /// Reset using a different RNG seed.
    pub fn reset_with_seed(&mut self, seed: Option<u64>) -> Option<FrameToken> {
        let seed = seed.unwrap_or_else(rand::random);
        self.store.reseed(&self.model, &self.params, seed);
        self.restart_lifecycle()
    }

    fn restart_lifecycle(&mut self) -> Option<FrameToken> {
        let cancelled = self.pending.take();
        self.lifecycle = Lifecycle::Idle;
        self.steps = Tick::zero();
        self.generation = Generation::default();
        self.frames = 0;
        self.trails.clear();
        self.readouts.clear();
        self.record_trail();
        self.render();
        info!(kind = M::KIND, seed = self.store.seed(), "simulation reset");
        cancelled
    }

    /// Frame callback. Stale tokens are ignored; otherwise steps (per the frame stride),
    /// renders, and returns the next token while still running.
    pub fn on_frame(&mut self, token: FrameToken) -> Option<FrameToken> {
        if self.pending != Some(token) {
            trace!(kind = M::KIND, token = token.id(), "ignoring stale frame callback");
            return None;
        }
        self.pending = None;
        self.frames += 1;
        if self.frames.is_multiple_of(u64::from(self.config.frame_stride)) {
            self.advance();
        }
        self.render();
        if self.lifecycle.is_running() {
            Some(self.issue_token())
        } else {
            None
        }
    }

    /// Re-render the current state without stepping.
    pub fn redraw(&mut self) {
        self.render();
    }

    /// Apply a model-defined user action; re-renders when the state changed.
    pub fn interact(&mut self, action: M::Action) -> bool
    where
        M: Interactive,
    {
        debug!(kind = M::KIND, ?action, "applying interaction");
        let (state, _) = self.store.parts_mut();
        let changed = self.model.interact(state, &self.params, action);
        if changed {
            self.render();
        }
        changed
    }

    /// Set knobs by name; takes effect from the next step. Touching one of the model's
    /// [`Model::RESET_KNOBS`] resets the engine instead, cancelling any pending frame.
    pub fn apply_knobs(&mut self, updates: &[KnobUpdate]) -> Result<(), EngineError> {
        self.params = knobs::apply_updates(&self.params, updates)?;
        debug!(kind = M::KIND, updates = updates.len(), "applied knob updates");
        if updates
            .iter()
            .any(|update| M::RESET_KNOBS.contains(&update.name.as_str()))
        {
            self.reset();
        } else if !self.lifecycle.is_running() {
            self.render();
        }
        Ok(())
    }

    /// Adjustable parameters with their current values.
    pub fn knobs(&self) -> Result<Vec<KnobEntry>, EngineError> {
        Ok(knobs::list_knobs(&self.params, M::KNOB_DOCS)?)
    }

    /// Replace all parameters at once.
    pub fn set_params(&mut self, params: M::Params) {
        self.params = params;
        if !self.lifecycle.is_running() {
            self.render();
        }
    }

    #[must_use]
    pub fn params(&self) -> &M::Params {
        &self.params
    }

    /// Mutable parameter access; edits apply from the next step onward.
    pub fn params_mut(&mut self) -> &mut M::Params {
        &mut self.params
    }

    #[must_use]
    pub fn state(&self) -> &M::State {
        self.store.state()
    }

    #[must_use]
    pub fn trails(&self) -> &TrailSet {
        &self.trails
    }

    #[must_use]
    pub fn readouts(&self) -> &Readouts {
        &self.readouts
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Integrator steps since the last reset.
    #[must_use]
    pub fn steps(&self) -> Tick {
        self.steps
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Accepted frame callbacks since the last reset.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Token of the callback the engine is waiting for, if running.
    #[must_use]
    pub fn pending_frame(&self) -> Option<FrameToken> {
        self.pending
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.store.seed()
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    fn issue_token(&mut self) -> FrameToken {
        self.next_token += 1;
        let token = FrameToken::new(self.next_token);
        self.pending = Some(token);
        token
    }

    fn advance(&mut self) {
        for _ in 0..self.config.substeps {
            let (state, rng) = self.store.parts_mut();
            let report = self.model.step(state, &self.params, rng);
            self.steps = self.steps.next();
            if report.generation_advanced {
                self.generation = self.generation.next();
                debug!(
                    kind = M::KIND,
                    generation = self.generation.0,
                    step = self.steps.0,
                    "generation boundary"
                );
            }
            if self.config.trail_every_substep {
                self.record_trail();
            }
            if self.should_finish() {
                self.finish();
                break;
            }
        }
        if !self.config.trail_every_substep {
            self.record_trail();
        }
    }

    fn should_finish(&self) -> bool {
        self.model.is_finished(self.store.state(), &self.params)
            || self
                .config
                .max_steps
                .is_some_and(|limit| self.steps.0 >= limit)
    }

    fn finish(&mut self) {
        self.lifecycle = Lifecycle::Finished;
        self.pending = None;
        info!(
            kind = M::KIND,
            steps = self.steps.0,
            generation = self.generation.0,
            "simulation finished"
        );
    }

    fn record_trail(&mut self) {
        self.scratch.clear();
        self.model
            .trace(self.store.state(), &self.params, &mut self.scratch);
        if !self.scratch.is_empty() {
            self.trails.record(&self.scratch);
        }
    }

    fn render(&mut self) {
        let view = FrameView {
            state: self.store.state(),
            params: &self.params,
            trails: &self.trails,
            lifecycle: self.lifecycle,
            steps: self.steps,
            generation: self.generation,
        };
        self.renderer.render(&view, &mut self.readouts);
    }
}

impl<M, R> fmt::Debug for Engine<M, R>
where
    M: Model,
    R: Renderer<M>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("kind", &M::KIND)
            .field("lifecycle", &self.lifecycle)
            .field("steps", &self.steps)
            .field("generation", &self.generation)
            .field("seed", &self.store.seed())
            .finish_non_exhaustive()
    }
}
