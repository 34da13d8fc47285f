//! Finite automaton scene: states on a horizontal axis with transitions.

use serde_json::{Map, Value};

use super::escape::is_tex_safe;
use super::script::{coord, py_str, Script};
use super::text;
use super::topology::{node_index, parse_edges, parse_nodes, self_loop, EdgeSpec, NodeSpec};
use super::value::text_field;

/// Maximum number of states drawn.
pub const MAX_NODES: usize = 6;

/// Maximum number of transitions read.
pub const MAX_EDGES: usize = 12;

/// Body shown when the automaton has no states.
pub const NO_NODES_MESSAGE: &str = "No DFA nodes provided.";

const NODE_SPACING: f64 = 2.0;
const SINGLE_NODE_X: f64 = -2.5;

/// Parameters for the `dfa` scene kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DfaParams {
    pub nodes: Vec<NodeSpec>,
    pub edges: Vec<EdgeSpec>,
    pub explanation: Option<String>,
}

impl DfaParams {
    pub fn from_params(params: &Map<String, Value>) -> Self {
        Self {
            nodes: parse_nodes(params, MAX_NODES, "q"),
            edges: parse_edges(params, MAX_EDGES),
            explanation: text_field(params, "explanation"),
        }
    }
}

/// Math-set label when the text is LaTeX-safe, plain text otherwise.
fn state_label(label: &str, scale: f64, font_size: u32) -> String {
    if is_tex_safe(label) {
        format!("MathTex({}).scale({scale})", py_str(label))
    } else {
        format!("Text({}, font_size={font_size})", py_str(label))
    }
}

pub fn build(title: &str, params: &DfaParams) -> String {
    let nodes = &params.nodes[..params.nodes.len().min(MAX_NODES)];
    if nodes.is_empty() {
        return text::build(title, NO_NODES_MESSAGE);
    }

    let start_x = if nodes.len() > 1 {
        -((nodes.len() - 1) as f64 * NODE_SPACING) / 2.0
    } else {
        SINGLE_NODE_X
    };

    let mut script = Script::new(title, false);
    for (i, node) in nodes.iter().enumerate() {
        let x = start_x + i as f64 * NODE_SPACING;
        script.stmt(format!(
            "s{i} = Circle(radius=0.45, color=BLUE).move_to([{}, 0, 0])",
            coord(x)
        ));
        script.stmt(format!(
            "s{i}_label = {}.move_to(s{i}.get_center())",
            state_label(&node.label, 0.9, 30)
        ));
        if node.accept {
            script.stmt(format!(
                "s{i}_accept = Circle(radius=0.55, color=BLUE).move_to(s{i}.get_center())"
            ));
        }
        script.stmt(format!("self.play(Create(s{i}), Write(s{i}_label))"));
        if node.accept {
            script.stmt(format!("self.play(Create(s{i}_accept))"));
        }
        if node.start {
            script.stmt(format!(
                "s{i}_start = Arrow([{}, 0, 0], s{i}.get_left(), buff=0.1)",
                coord(x - 1.2)
            ));
            script.stmt(format!("self.play(Create(s{i}_start))"));
        }
    }

    script.blank();
    script.comment("Transitions");
    for (k, edge) in params.edges.iter().take(MAX_EDGES).enumerate() {
        let (Some(a), Some(b)) = (node_index(nodes, &edge.from), node_index(nodes, &edge.to))
        else {
            continue;
        };
        let arrow = if a == b {
            self_loop(&format!("s{a}"))
        } else {
            format!("Arrow(s{a}.get_center(), s{b}.get_center(), buff=0.6)")
        };
        script.stmt(format!("e{k} = {arrow}"));
        script.stmt(format!("self.play(Create(e{k}))"));
        if let Some(label) = &edge.label {
            script.stmt(format!(
                "e{k}_label = {}.next_to(e{k}, UP)",
                state_label(label, 0.8, 24)
            ));
            script.stmt(format!("self.play(Write(e{k}_label))"));
        }
    }

    if let Some(explanation) = &params.explanation {
        script.blank();
        script.stmt(format!(
            "expl = Text({}, font_size=30).to_edge(DOWN)",
            py_str(explanation)
        ));
        script.stmt("self.play(Write(expl))");
    }

    script.finish()
}
