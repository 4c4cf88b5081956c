//! Integrator contract implemented by every demo.

use std::fmt;

use rand::rngs::SmallRng;
use serde::{Serialize, de::DeserializeOwned};

use crate::{EngineConfig, Position};

/// Outcome flags reported by a single integrator step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// The step ended in a generation boundary (population rebuilt from survivors).
    pub generation_advanced: bool,
}

impl StepReport {
    #[must_use]
    pub const fn generation() -> Self {
        Self {
            generation_advanced: true,
        }
    }
}

/// A discrete-time system: how to build its initial state and how to advance it one step.
///
/// `step` is the only place state changes during a run. Parameters are read fresh on every
/// call so live edits apply from the next step onward.
pub trait Model {
    /// Stable identifier used in logs, CLI arguments, and reports.
    const KIND: &'static str;

    /// Knob-name-to-description pairs surfaced when listing knobs.
    const KNOB_DOCS: &'static [(&'static str, &'static str)] = &[];

    /// Knobs that describe the initial state; changing one resets the engine.
    const RESET_KNOBS: &'static [&'static str] = &[];

    type State: Clone + fmt::Debug + PartialEq;
    type Params: Clone + fmt::Debug + Default + Serialize + DeserializeOwned;

    /// Build the initial state. Must depend only on `params` and draws from `rng`.
    fn initialize(&self, params: &Self::Params, rng: &mut SmallRng) -> Self::State;

    /// Advance `state` by exactly one step.
    fn step(&self, state: &mut Self::State, params: &Self::Params, rng: &mut SmallRng)
    -> StepReport;

    /// Current trail point of each tracked entity, in a stable order.
    fn trace(
        &self,
        _state: &Self::State,
        _params: &Self::Params,
        _points: &mut Vec<Position>,
    ) {
    }

    /// Stopping predicate for demos with a natural endpoint.
    fn is_finished(&self, _state: &Self::State, _params: &Self::Params) -> bool {
        false
    }

    /// Loop settings this demo expects when none are supplied.
    fn engine_defaults(&self) -> EngineConfig {
        EngineConfig::default()
    }
}

/// Models that accept discrete user actions (clicks, buttons) as state transitions.
pub trait Interactive: Model {
    type Action: fmt::Debug;

    /// Apply `action`, returning whether the state changed.
    fn interact(
        &self,
        state: &mut Self::State,
        params: &Self::Params,
        action: Self::Action,
    ) -> bool;
}
