//! Node and edge shapes shared by the `dfa` and `diagram` scene kinds.
//!
//! Ids are display keys only. Builders resolve edge endpoints to node
//! indices and name script variables after those indices.

use serde_json::{Map, Value};

use super::value::{array_field, flag, scalar_text, text_field};

/// A labelled node. `start`/`accept` only affect automaton rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub id: String,
    pub label: String,
    pub start: bool,
    pub accept: bool,
}

impl NodeSpec {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            start: false,
            accept: false,
        }
    }
}

/// A directed, optionally labelled edge between two node ids.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSpec {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
}

impl EdgeSpec {
    pub fn new(from: impl Into<String>, to: impl Into<String>, label: Option<&str>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: label.map(str::to_string),
        }
    }
}

/// Read up to `max` nodes from `params.nodes`.
///
/// A missing id defaults to `{default_prefix}{index}`, a missing label to
/// the id. A bare scalar entry is used as both id and label.
pub fn parse_nodes(params: &Map<String, Value>, max: usize, default_prefix: &str) -> Vec<NodeSpec> {
    array_field(params, "nodes")
        .iter()
        .take(max)
        .enumerate()
        .map(|(i, v)| match v.as_object() {
            Some(obj) => {
                let id = text_field(obj, "id").unwrap_or_else(|| format!("{default_prefix}{i}"));
                let label = text_field(obj, "label").unwrap_or_else(|| id.clone());
                NodeSpec {
                    id,
                    label,
                    start: flag(obj, "start", false),
                    accept: flag(obj, "accept", false),
                }
            }
            None => {
                let id = scalar_text(v)
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| format!("{default_prefix}{i}"));
                NodeSpec::new(id.clone(), id)
            }
        })
        .collect()
}

/// Read up to `max` entries from `params.edges`; entries without both
/// endpoints are dropped after the cap is applied.
pub fn parse_edges(params: &Map<String, Value>, max: usize) -> Vec<EdgeSpec> {
    array_field(params, "edges")
        .iter()
        .take(max)
        .filter_map(Value::as_object)
        .filter_map(|obj| {
            Some(EdgeSpec {
                from: text_field(obj, "from")?,
                to: text_field(obj, "to")?,
                label: text_field(obj, "label"),
            })
        })
        .collect()
}

/// Index of the first node with the given id.
pub fn node_index(nodes: &[NodeSpec], id: &str) -> Option<usize> {
    nodes.iter().position(|n| n.id == id)
}

/// Curved arrow looping over the top of the mobject bound to `var`.
pub fn self_loop(var: &str) -> String {
    format!("CurvedArrow({var}.get_top() + LEFT*0.3, {var}.get_top() + RIGHT*0.3, angle=-PI)")
}
