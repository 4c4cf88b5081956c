//! Weighted graph with the current shortest-path selection.

use simloop_models::graph::{NodeId, PathSelection, WeightedGraph};

use crate::{Canvas, palette};

pub const NODE_RADIUS: f32 = 20.0;
const WEIGHT_BADGE_RADIUS: f32 = 12.0;

fn on_path(path: &[NodeId], a: NodeId, b: NodeId) -> bool {
    path.windows(2)
        .any(|pair| (pair[0] == a && pair[1] == b) || (pair[0] == b && pair[1] == a))
}

/// Draw `graph` in its own pixel coordinates; path edges and nodes are highlighted.
pub fn draw_graph(canvas: &mut Canvas, graph: &WeightedGraph, selection: &PathSelection) {
    canvas.clear(palette::BACKGROUND);
    let path: &[NodeId] = selection
        .path
        .as_ref()
        .map_or(&[], |path| path.nodes.as_slice());

    for edge in graph.edges() {
        let (Some(from), Some(to)) = (graph.node(edge.from), graph.node(edge.to)) else {
            continue;
        };
        let (a, b) = (
            (from.position.x, from.position.y),
            (to.position.x, to.position.y),
        );
        if on_path(path, edge.from, edge.to) {
            canvas.line(a, b, 4.0, palette::GREEN);
        } else {
            canvas.line(a, b, 2.0, palette::GRID);
        }
        let mid = ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
        canvas.fill_circle(mid.0, mid.1, WEIGHT_BADGE_RADIUS, palette::BACKGROUND);
        canvas.stroke_circle(mid.0, mid.1, WEIGHT_BADGE_RADIUS, 1.0, palette::GRID);
    }

    for (idx, node) in graph.nodes().iter().enumerate() {
        let id = NodeId(idx);
        let color = if selection.start == Some(id) {
            palette::GREEN
        } else if selection.end == Some(id) {
            palette::RED
        } else if path.contains(&id) {
            palette::GREEN
        } else {
            palette::BLUE
        };
        let (x, y) = (node.position.x, node.position.y);
        canvas.fill_circle(x, y, NODE_RADIUS, color);
        canvas.stroke_circle(x, y, NODE_RADIUS, 2.0, palette::BACKGROUND);
    }
}

#[cfg(test)]
mod tests {
    use simloop_core::Position;

    use super::*;

    #[test]
    fn path_edges_are_highlighted() {
        let mut graph = WeightedGraph::new();
        let a = graph.add_node("A", Position::new(30.0, 50.0));
        let b = graph.add_node("B", Position::new(150.0, 50.0));
        let c = graph.add_node("C", Position::new(270.0, 50.0));
        graph.add_edge(a, b, 1).expect("edge");
        graph.add_edge(b, c, 2).expect("edge");

        let mut selection = PathSelection::default();
        selection.click(a);
        selection.click(c);
        selection.solve(&graph).expect("solve");

        let mut canvas = Canvas::new(300, 100);
        draw_graph(&mut canvas, &graph, &selection);
        assert_eq!(canvas.pixel(30, 50), Some(palette::GREEN));
        assert_eq!(canvas.pixel(270, 50), Some(palette::RED));
        // Edge A-B, between the node disc and the weight badge.
        assert_eq!(canvas.pixel(60, 50), Some(palette::GREEN));
    }
}
