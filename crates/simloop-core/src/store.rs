//! Canonical simulation state plus the RNG that produced it.

use rand::{SeedableRng, rngs::SmallRng};

use crate::Model;

/// Owns the state of one engine and the seeded RNG feeding both initialization and steps.
#[derive(Debug)]
pub struct StateStore<M: Model> {
    state: M::State,
    seed: u64,
    rng: SmallRng,
}

impl<M: Model> StateStore<M> {
    /// Build the initial state from `params` using an RNG seeded with `seed`.
    pub fn initialize(model: &M, params: &M::Params, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let state = model.initialize(params, &mut rng);
        Self { state, seed, rng }
    }

    /// Discard the current state and rebuild it with the original seed.
    pub fn reset(&mut self, model: &M, params: &M::Params) {
        *self = Self::initialize(model, params, self.seed);
    }

    /// Rebuild with a different seed.
    pub fn reseed(&mut self, model: &M, params: &M::Params, seed: u64) {
        *self = Self::initialize(model, params, seed);
    }

    #[must_use]
    pub fn state(&self) -> &M::State {
        &self.state
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Split borrow handed to the integrator and to interaction handlers.
    pub(crate) fn parts_mut(&mut self) -> (&mut M::State, &mut SmallRng) {
        (&mut self.state, &mut self.rng)
    }
}
