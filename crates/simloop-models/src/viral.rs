//! Information cascade over a random geometric network.
//!
//! A click seeds one node; every step is one round in which each node infected during the
//! previous round tries to pass the content to each uninfected neighbour.

use rand::{Rng, rngs::SmallRng};
use serde::{Deserialize, Serialize};
use simloop_core::{EngineConfig, Interactive, Model, Position, StepReport};
use tracing::{debug, info};

use crate::random_position;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub position: Position,
    /// Round in which the node was infected; the seed is round 0.
    pub infected_round: Option<u32>,
}

/// Progress of the cascade started by the last seed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cascade {
    /// Round whose infections spread next.
    pub round: u32,
    /// Infections caused by spreading (the seed excluded).
    pub total_spread: u32,
    /// Nodes that have had their spreading round.
    pub spread_events: u32,
    pub complete: bool,
}

impl Cascade {
    /// Average new infections per spreading node.
    #[must_use]
    pub fn reproduction_number(&self) -> Option<f64> {
        (self.spread_events > 0).then(|| f64::from(self.total_spread) / f64::from(self.spread_events))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub nodes: Vec<NetworkNode>,
    /// Undirected edges, `a < b`.
    pub edges: Vec<(usize, usize)>,
    pub adjacency: Vec<Vec<usize>>,
    pub cascade: Option<Cascade>,
}

impl Network {
    #[must_use]
    pub fn infected_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.infected_round.is_some())
            .count()
    }

    /// Deepest round reached so far.
    #[must_use]
    pub fn max_round(&self) -> u32 {
        self.nodes
            .iter()
            .filter_map(|n| n.infected_round)
            .max()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn is_infected(&self, idx: usize) -> bool {
        self.nodes
            .get(idx)
            .is_some_and(|n| n.infected_round.is_some())
    }

    /// A seed is pending or spreading.
    #[must_use]
    pub fn is_spreading(&self) -> bool {
        self.cascade.is_some_and(|c| !c.complete)
    }

    fn seed(&mut self, idx: usize) {
        for node in &mut self.nodes {
            node.infected_round = None;
        }
        self.nodes[idx].infected_round = Some(0);
        self.cascade = Some(Cascade::default());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViralParams {
    pub width: f32,
    pub height: f32,
    pub nodes: usize,
    /// Connection density 1 (sparse) to 3 (dense).
    pub density: u32,
    /// Chance that one share reaches one neighbour.
    pub spread_probability: f32,
    pub padding: f32,
    pub pick_radius: f32,
}

impl Default for ViralParams {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
            nodes: 30,
            density: 2,
            spread_probability: 0.5,
            padding: 30.0,
            pick_radius: 15.0,
        }
    }
}

impl ViralParams {
    /// Nodes closer than this are connected.
    #[must_use]
    pub fn connection_range(&self) -> f32 {
        match self.density {
            0 | 1 => 60.0,
            2 => 100.0,
            _ => 150.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViralAction {
    /// Seed the first node within the pick radius of a point.
    SeedAt { x: f32, y: f32 },
    /// Seed a node by index.
    SeedNode(usize),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ViralCascade;

impl Model for ViralCascade {
    const KIND: &'static str = "viral";
    const KNOB_DOCS: &'static [(&'static str, &'static str)] = &[
        ("spread_probability", "chance that a share reaches a neighbour"),
        ("density", "connection density 1-3, applied on reset"),
    ];

    type State = Network;
    type Params = ViralParams;

    fn initialize(&self, params: &ViralParams, rng: &mut SmallRng) -> Network {
        let nodes: Vec<NetworkNode> = (0..params.nodes)
            .map(|_| NetworkNode {
                position: random_position(rng, params.width, params.height, params.padding),
                infected_round: None,
            })
            .collect();
        let range_sq = params.connection_range().powi(2);
        let mut edges = Vec::new();
        let mut adjacency = vec![Vec::new(); nodes.len()];
        for a in 0..nodes.len() {
            for b in a + 1..nodes.len() {
                if nodes[a].position.distance_sq(nodes[b].position) < range_sq {
                    edges.push((a, b));
                    adjacency[a].push(b);
                    adjacency[b].push(a);
                }
            }
        }
        Network {
            nodes,
            edges,
            adjacency,
            cascade: None,
        }
    }

    fn step(&self, state: &mut Network, params: &ViralParams, rng: &mut SmallRng) -> StepReport {
        let Some(mut cascade) = state.cascade.filter(|c| !c.complete) else {
            return StepReport::default();
        };
        let spreaders: Vec<usize> = state
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.infected_round == Some(cascade.round))
            .map(|(idx, _)| idx)
            .collect();

        let mut new_infections = 0;
        for &spreader in &spreaders {
            for &neighbor in &state.adjacency[spreader] {
                if state.nodes[neighbor].infected_round.is_none()
                    && rng.random::<f32>() < params.spread_probability
                {
                    state.nodes[neighbor].infected_round = Some(cascade.round + 1);
                    new_infections += 1;
                }
            }
            cascade.spread_events += 1;
        }
        cascade.total_spread += new_infections;
        if !spreaders.is_empty() {
            cascade.round += 1;
        }
        cascade.complete = new_infections == 0;
        debug!(round = cascade.round, new_infections, "cascade round");
        if cascade.complete {
            info!(
                infected = state.infected_count(),
                rounds = cascade.round,
                "cascade complete"
            );
        }
        state.cascade = Some(cascade);
        StepReport::default()
    }

    fn is_finished(&self, state: &Network, _params: &ViralParams) -> bool {
        state.cascade.is_some_and(|c| c.complete)
    }

    fn engine_defaults(&self) -> EngineConfig {
        EngineConfig {
            frame_stride: 36,
            ..EngineConfig::default()
        }
    }
}

impl Interactive for ViralCascade {
    type Action = ViralAction;

    /// Seeds are ignored while a cascade is running or after one completed; a reset
    /// rebuilds the network first.
    fn interact(&self, state: &mut Network, params: &ViralParams, action: ViralAction) -> bool {
        if state.cascade.is_some() {
            return false;
        }
        let target = match action {
            ViralAction::SeedNode(idx) => (idx < state.nodes.len()).then_some(idx),
            ViralAction::SeedAt { x, y } => {
                let click = Position::new(x, y);
                let reach_sq = params.pick_radius * params.pick_radius;
                state
                    .nodes
                    .iter()
                    .position(|n| n.position.distance_sq(click) < reach_sq)
            }
        };
        let Some(idx) = target else {
            return false;
        };
        state.seed(idx);
        info!(node = idx, "cascade seeded");
        true
    }
}
