//! Undirected weighted graphs for the pathfinding and graph-builder widgets.

use std::{cmp::Reverse, collections::BinaryHeap, fmt};

use rand::Rng;
use serde::{Deserialize, Serialize};
use simloop_core::Position;
use thiserror::Error;

/// Index of a node within its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub label: String,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    #[error("no node labelled `{0}`")]
    UnknownLabel(String),
    #[error("self loop on node {0}")]
    SelfLoop(NodeId),
}

/// Lowest-weight route between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortestPath {
    pub nodes: Vec<NodeId>,
    pub weight: u64,
}

impl ShortestPath {
    /// Node labels along the path.
    #[must_use]
    pub fn labels<'g>(&self, graph: &'g WeightedGraph) -> Vec<&'g str> {
        self.nodes
            .iter()
            .filter_map(|&id| graph.node(id))
            .map(|node| node.label.as_str())
            .collect()
    }
}

/// Graph with parallel node and edge lists, as drawn by the widgets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightedGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<Edge>,
}

impl WeightedGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, label: impl Into<String>, position: Position) -> NodeId {
        self.nodes.push(GraphNode {
            label: label.into(),
            position,
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn add_edge(&mut self, from: NodeId, to: NodeId, weight: u32) -> Result<(), GraphError> {
        self.check(from)?;
        self.check(to)?;
        if from == to {
            return Err(GraphError::SelfLoop(from));
        }
        self.edges.push(Edge { from, to, weight });
        Ok(())
    }

    /// Adds an edge between labelled nodes, creating missing nodes at the origin.
    pub fn connect_labels(&mut self, from: &str, to: &str, weight: u32) -> Result<(), GraphError> {
        let from = self.ensure_label(from);
        let to = self.ensure_label(to);
        self.add_edge(from, to, weight)
    }

    fn ensure_label(&mut self, label: &str) -> NodeId {
        match self.node_by_label(label) {
            Some(id) => id,
            None => self.add_node(label, Position::default()),
        }
    }

    fn check(&self, id: NodeId) -> Result<(), GraphError> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(GraphError::UnknownNode(id))
        }
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id.0)
    }

    #[must_use]
    pub fn node_by_label(&self, label: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.label == label).map(NodeId)
    }

    /// Resolve a label or fail with [`GraphError::UnknownLabel`].
    pub fn require_label(&self, label: &str) -> Result<NodeId, GraphError> {
        self.node_by_label(label)
            .ok_or_else(|| GraphError::UnknownLabel(label.to_owned()))
    }

    #[must_use]
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node whose centre lies within `radius` of `(x, y)`.
    #[must_use]
    pub fn node_at(&self, x: f32, y: f32, radius: f32) -> Option<NodeId> {
        let click = Position::new(x, y);
        self.nodes
            .iter()
            .position(|n| n.position.distance_sq(click) < radius * radius)
            .map(NodeId)
    }

    /// Whether `a` and `b` are joined by an edge in either direction.
    #[must_use]
    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.edges
            .iter()
            .any(|e| (e.from == a && e.to == b) || (e.from == b && e.to == a))
    }

    fn adjacency(&self) -> Vec<Vec<(usize, u32)>> {
        let mut adjacency = vec![Vec::new(); self.nodes.len()];
        for edge in &self.edges {
            adjacency[edge.from.0].push((edge.to.0, edge.weight));
            adjacency[edge.to.0].push((edge.from.0, edge.weight));
        }
        adjacency
    }

    /// Dijkstra from `start` to `end`. `Ok(None)` when `end` is unreachable.
    pub fn shortest_path(
        &self,
        start: NodeId,
        end: NodeId,
    ) -> Result<Option<ShortestPath>, GraphError> {
        self.check(start)?;
        self.check(end)?;

        let adjacency = self.adjacency();
        let mut dist = vec![u64::MAX; self.nodes.len()];
        let mut prev: Vec<Option<usize>> = vec![None; self.nodes.len()];
        let mut heap = BinaryHeap::new();
        dist[start.0] = 0;
        heap.push(Reverse((0_u64, start.0)));

        while let Some(Reverse((d, node))) = heap.pop() {
            if d > dist[node] {
                continue;
            }
            if node == end.0 {
                break;
            }
            for &(next, weight) in &adjacency[node] {
                let candidate = d + u64::from(weight);
                if candidate < dist[next] {
                    dist[next] = candidate;
                    prev[next] = Some(node);
                    heap.push(Reverse((candidate, next)));
                }
            }
        }

        if dist[end.0] == u64::MAX {
            return Ok(None);
        }
        let mut nodes = vec![end];
        let mut cursor = end.0;
        while let Some(p) = prev[cursor] {
            nodes.push(NodeId(p));
            cursor = p;
        }
        nodes.reverse();
        Ok(Some(ShortestPath {
            nodes,
            weight: dist[end.0],
        }))
    }

    /// Connected components, counted with union-find.
    #[must_use]
    pub fn component_count(&self) -> usize {
        let mut parent: Vec<usize> = (0..self.nodes.len()).collect();
        fn find(parent: &mut [usize], x: usize) -> usize {
            let mut root = x;
            while parent[root] != root {
                root = parent[root];
            }
            let mut cursor = x;
            while parent[cursor] != root {
                let next = parent[cursor];
                parent[cursor] = root;
                cursor = next;
            }
            root
        }
        for edge in &self.edges {
            let a = find(&mut parent, edge.from.0);
            let b = find(&mut parent, edge.to.0);
            if a != b {
                parent[a] = b;
            }
        }
        (0..self.nodes.len())
            .filter(|&i| find(&mut parent, i) == i)
            .count()
    }

    /// Mean number of edge endpoints per node; zero for an empty graph.
    #[must_use]
    pub fn average_degree(&self) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        (2 * self.edges.len()) as f64 / self.nodes.len() as f64
    }

    /// A 4×3 jittered grid of nodes labelled from 1, with edges between close
    /// neighbours weighted by `floor(distance / 30) + 1`.
    pub fn random_grid<R: Rng + ?Sized>(width: f32, height: f32, rng: &mut R) -> Self {
        const COLS: usize = 4;
        const ROWS: usize = 3;
        const PADDING: f32 = 50.0;

        let cell_w = (width - 2.0 * PADDING) / (COLS - 1) as f32;
        let cell_h = (height - 2.0 * PADDING) / (ROWS - 1) as f32;
        let mut graph = Self::new();
        for row in 0..ROWS {
            for col in 0..COLS {
                let x = PADDING + col as f32 * cell_w + (rng.random::<f32>() - 0.5) * cell_w * 0.3;
                let y = PADDING + row as f32 * cell_h + (rng.random::<f32>() - 0.5) * cell_h * 0.3;
                let label = (graph.len() + 1).to_string();
                graph.add_node(label, Position::new(x, y));
            }
        }

        let max_dist = cell_w * 1.5;
        for a in 0..graph.len() {
            for b in a + 1..graph.len() {
                let dist = graph.nodes[a]
                    .position
                    .distance_sq(graph.nodes[b].position)
                    .sqrt();
                if dist < max_dist && rng.random::<f32>() > 0.3 {
                    graph.edges.push(Edge {
                        from: NodeId(a),
                        to: NodeId(b),
                        weight: (dist / 30.0).floor() as u32 + 1,
                    });
                }
            }
        }
        graph
    }
}

/// Start/end selection for the pathfinding widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSelection {
    pub start: Option<NodeId>,
    pub end: Option<NodeId>,
    pub path: Option<ShortestPath>,
}

impl PathSelection {
    /// First click picks the start, second the end; a third starts over.
    pub fn click(&mut self, node: NodeId) {
        match (self.start, self.end) {
            (None, _) => self.start = Some(node),
            (Some(start), None) if start != node => self.end = Some(node),
            (Some(_), None) => {}
            (Some(_), Some(_)) => {
                *self = Self {
                    start: Some(node),
                    ..Self::default()
                };
            }
        }
    }

    /// Run Dijkstra between the selected nodes.
    pub fn solve(&mut self, graph: &WeightedGraph) -> Result<Option<&ShortestPath>, GraphError> {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return Ok(None);
        };
        self.path = graph.shortest_path(start, end)?;
        Ok(self.path.as_ref())
    }

    /// Status line shown under the graph.
    #[must_use]
    pub fn status(&self, graph: &WeightedGraph) -> String {
        let label = |id: NodeId| graph.node(id).map_or("?", |n| n.label.as_str()).to_owned();
        match (self.start, self.end, &self.path) {
            (None, _, _) => "Click on two nodes to select start and end points".to_owned(),
            (Some(start), None, _) => {
                format!("Start: Node {} - Click another node for end point", label(start))
            }
            (Some(start), Some(end), None) => format!(
                "Path from Node {} to Node {} - Click \"Find Shortest Path\"",
                label(start),
                label(end)
            ),
            (Some(_), Some(_), Some(path)) => {
                let labels = path.labels(graph).join(" → ");
                format!("Shortest path length: {} | Path: {labels}", path.weight)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::SmallRng};

    fn triangle() -> WeightedGraph {
        let mut graph = WeightedGraph::new();
        graph.connect_labels("A", "B", 1).expect("A-B");
        graph.connect_labels("B", "C", 2).expect("B-C");
        graph.connect_labels("A", "C", 5).expect("A-C");
        graph
    }

    #[test]
    fn prefers_the_cheaper_detour() {
        let graph = triangle();
        let a = graph.require_label("A").expect("A");
        let c = graph.require_label("C").expect("C");
        let path = graph.shortest_path(a, c).expect("valid").expect("reachable");
        assert_eq!(path.labels(&graph), ["A", "B", "C"]);
        assert_eq!(path.weight, 3);
    }

    #[test]
    fn path_to_self_is_trivial() {
        let graph = triangle();
        let path = graph
            .shortest_path(NodeId(1), NodeId(1))
            .expect("valid")
            .expect("reachable");
        assert_eq!(path.nodes, [NodeId(1)]);
        assert_eq!(path.weight, 0);
    }

    #[test]
    fn unreachable_and_unknown_nodes() {
        let mut graph = triangle();
        let island = graph.add_node("D", Position::default());
        assert_eq!(graph.shortest_path(NodeId(0), island), Ok(None));
        assert_eq!(
            graph.shortest_path(NodeId(0), NodeId(9)),
            Err(GraphError::UnknownNode(NodeId(9)))
        );
        assert_eq!(graph.add_edge(island, island, 1), Err(GraphError::SelfLoop(island)));
        assert!(matches!(graph.require_label("Z"), Err(GraphError::UnknownLabel(_))));
    }

    #[test]
    fn components_and_degree() {
        let mut graph = triangle();
        assert_eq!(graph.component_count(), 1);
        assert!((graph.average_degree() - 2.0).abs() < 1e-12);
        graph.add_node("D", Position::default());
        let e = graph.add_node("E", Position::default());
        let d = graph.require_label("D").expect("D");
        graph.add_edge(d, e, 1).expect("D-E");
        assert_eq!(graph.component_count(), 2);
        assert_eq!(WeightedGraph::new().component_count(), 0);
        assert_eq!(WeightedGraph::new().average_degree(), 0.0);
    }

    #[test]
    fn random_grid_has_twelve_labelled_nodes_and_local_edges() {
        let mut rng = SmallRng::seed_from_u64(17);
        let graph = WeightedGraph::random_grid(600.0, 400.0, &mut rng);
        assert_eq!(graph.len(), 12);
        assert_eq!(graph.nodes()[0].label, "1");
        assert_eq!(graph.nodes()[11].label, "12");
        let cell_w = 500.0 / 3.0;
        for edge in graph.edges() {
            let a = graph.node(edge.from).expect("from").position;
            let b = graph.node(edge.to).expect("to").position;
            let dist = a.distance_sq(b).sqrt();
            assert!(dist < cell_w * 1.5);
            assert_eq!(edge.weight, (dist / 30.0).floor() as u32 + 1);
        }
    }

    #[test]
    fn selection_cycles_through_start_end_and_result() {
        let graph = triangle();
        let mut selection = PathSelection::default();
        assert!(selection.status(&graph).starts_with("Click on two nodes"));
        selection.click(NodeId(0));
        selection.click(NodeId(0));
        assert_eq!(selection.end, None);
        selection.click(NodeId(2));
        assert!(selection.status(&graph).contains("Node A to Node C"));
        let path = selection.solve(&graph).expect("valid").expect("path");
        assert_eq!(path.weight, 3);
        assert_eq!(
            selection.status(&graph),
            "Shortest path length: 3 | Path: A → B → C"
        );
        selection.click(NodeId(1));
        assert_eq!(selection.start, Some(NodeId(1)));
        assert_eq!(selection.end, None);
        assert_eq!(selection.path, None);
    }
}
