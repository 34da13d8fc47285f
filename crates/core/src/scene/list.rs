//! List scene: up to eight bulleted items under the title.

use serde_json::{Map, Value};

use super::script::{coord, py_str, Script};
use super::value::{array_field, scalar_text};

/// Maximum number of bullets shown.
pub const MAX_ITEMS: usize = 8;

const FIRST_ITEM_Y: f64 = 1.8;
const ITEM_SPACING: f64 = 0.6;

/// Parameters for the `list` scene kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListParams {
    pub items: Vec<String>,
}

impl ListParams {
    /// Read `items`. Scalars are shown as text; nested structures are
    /// shown as their compact JSON.
    pub fn from_params(params: &Map<String, Value>) -> Self {
        let items = array_field(params, "items")
            .iter()
            .take(MAX_ITEMS)
            .map(|v| scalar_text(v).unwrap_or_else(|| v.to_string()))
            .collect();
        Self { items }
    }
}

pub fn build(title: &str, params: &ListParams) -> String {
    let mut script = Script::new(title, false);
    for (i, item) in params.items.iter().take(MAX_ITEMS).enumerate() {
        let y = FIRST_ITEM_Y - i as f64 * ITEM_SPACING;
        script.stmt(format!(
            "it{i} = Text({}, font_size=34).move_to([-4.5, {}, 0]).align_to(title, LEFT)",
            py_str(&format!("• {item}")),
            coord(y)
        ));
        script.stmt(format!("self.play(Write(it{i}))"));
    }
    script.finish()
}
