//! Generic box-and-arrow diagram scene.

use serde_json::{Map, Value};

use super::script::{coord, py_str, Script};
use super::text;
use super::topology::{node_index, parse_edges, parse_nodes, self_loop, EdgeSpec, NodeSpec};

/// Maximum number of boxes drawn.
pub const MAX_NODES: usize = 6;

/// Maximum number of arrows read.
pub const MAX_EDGES: usize = 10;

/// Body shown when the diagram has no nodes.
pub const NO_NODES_MESSAGE: &str = "No diagram nodes provided.";

const NODE_SPACING: f64 = 3.0;

/// Fixed layout for exactly three nodes: two low corners and a raised middle.
const TRIANGLE: [(f64, f64); 3] = [(-4.0, -1.0), (0.0, 1.2), (4.0, -1.0)];

/// Parameters for the `diagram` scene kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiagramParams {
    pub nodes: Vec<NodeSpec>,
    pub edges: Vec<EdgeSpec>,
}

impl DiagramParams {
    pub fn from_params(params: &Map<String, Value>) -> Self {
        Self {
            nodes: parse_nodes(params, MAX_NODES, "n"),
            edges: parse_edges(params, MAX_EDGES),
        }
    }
}

/// Box centres for `count` nodes.
fn layout(count: usize) -> Vec<(f64, f64)> {
    if count == TRIANGLE.len() {
        return TRIANGLE.to_vec();
    }
    let start_x = -((count.saturating_sub(1)) as f64 * NODE_SPACING) / 2.0;
    (0..count)
        .map(|i| (start_x + i as f64 * NODE_SPACING, 0.0))
        .collect()
}

pub fn build(title: &str, params: &DiagramParams) -> String {
    let nodes = &params.nodes[..params.nodes.len().min(MAX_NODES)];
    if nodes.is_empty() {
        return text::build(title, NO_NODES_MESSAGE);
    }

    let mut script = Script::new(title, false);
    for (i, (node, (x, y))) in nodes.iter().zip(layout(nodes.len())).enumerate() {
        script.stmt(format!("n{i}_txt = Text({}, font_size=30)", py_str(&node.label)));
        script.stmt(format!(
            "n{i}_box = SurroundingRectangle(n{i}_txt, buff=0.35, corner_radius=0.2)"
        ));
        script.stmt(format!(
            "n{i} = VGroup(n{i}_box, n{i}_txt).move_to([{}, {}, 0])",
            coord(x),
            coord(y)
        ));
        script.stmt(format!("self.play(FadeIn(n{i}))"));
    }

    script.blank();
    script.comment("Arrows");
    for (k, edge) in params.edges.iter().take(MAX_EDGES).enumerate() {
        let (Some(a), Some(b)) = (node_index(nodes, &edge.from), node_index(nodes, &edge.to))
        else {
            continue;
        };
        let arrow = if a == b {
            self_loop(&format!("n{a}"))
        } else {
            format!("Arrow(n{a}.get_right(), n{b}.get_left(), buff=0.15)")
        };
        script.stmt(format!("e{k} = {arrow}"));
        script.stmt(format!("self.play(Create(e{k}))"));
        if let Some(label) = &edge.label {
            script.stmt(format!(
                "e{k}_label = Text({}, font_size=24).next_to(e{k}, UP)",
                py_str(label)
            ));
            script.stmt(format!("self.play(Write(e{k}_label))"));
        }
    }

    script.finish()
}
