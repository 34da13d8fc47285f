//! Text scene: a title with up to seven lines stacked beneath it.

use serde_json::{Map, Value};

use super::script::{coord, py_str, Script};
use super::value::text_field;

/// Maximum number of content lines shown.
pub const MAX_LINES: usize = 7;

/// Y position of the first content line.
const FIRST_LINE_Y: f64 = 1.8;

/// Vertical distance between content lines.
const LINE_SPACING: f64 = 0.65;

/// Parameters for the `text` scene kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextParams {
    /// Body text; `None` renders the title as the body.
    pub content: Option<String>,
}

impl TextParams {
    /// Read `content`, falling back to `text`.
    pub fn from_params(params: &Map<String, Value>) -> Self {
        Self {
            content: text_field(params, "content").or_else(|| text_field(params, "text")),
        }
    }
}

/// Build a text scene from `content`.
pub fn build(title: &str, content: &str) -> String {
    let mut lines: Vec<&str> = content
        .split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(MAX_LINES)
        .collect();
    if lines.is_empty() {
        lines.push(title);
    }

    let mut script = Script::new(title, false);
    for (i, line) in lines.iter().enumerate() {
        let y = FIRST_LINE_Y - i as f64 * LINE_SPACING;
        script.stmt(format!(
            "t{i} = Text({}, font_size=34).move_to([0, {}, 0])",
            py_str(line),
            coord(y)
        ));
        script.stmt(format!("self.play(Write(t{i}))"));
    }
    script.finish()
}
