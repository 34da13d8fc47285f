//! Line-oriented builder for generated Manim scripts.

use super::escape::escape_py_string;

/// Name of the scene class every generated script defines.
pub const SCENE_CLASS: &str = "GeneratedScene";

/// Indentation of statements inside `construct`.
const BODY_INDENT: &str = "        ";

/// Accumulates the body of `GeneratedScene.construct`.
///
/// Construction always emits the imports, class header, and the title
/// `Write`; [`Script::finish`] appends the closing wait.
#[derive(Debug)]
pub struct Script {
    lines: Vec<String>,
}

impl Script {
    /// Start a script with the standard header and an animated title.
    pub fn new(title: &str, with_numpy: bool) -> Self {
        let mut lines = vec!["from manim import *".to_string()];
        if with_numpy {
            lines.push("import numpy as np".to_string());
        }
        lines.push(String::new());
        lines.push(format!("class {SCENE_CLASS}(Scene):"));
        lines.push("    def construct(self):".to_string());

        let mut script = Self { lines };
        script.stmt(format!(
            "title = Text({}, font_size=52).to_edge(UP)",
            py_str(title)
        ));
        script.stmt("self.play(Write(title))");
        script.blank();
        script
    }

    /// Append one statement to the `construct` body.
    pub fn stmt(&mut self, line: impl AsRef<str>) {
        self.lines.push(format!("{BODY_INDENT}{}", line.as_ref()));
    }

    /// Append a `#` comment line to the body. `text` must be trusted.
    pub fn comment(&mut self, text: &str) {
        self.stmt(format!("# {text}"));
    }

    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// Close the scene with a two second hold and render the text.
    pub fn finish(mut self) -> String {
        self.stmt("self.wait(2)");
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

/// Double-quoted, escaped Python string literal.
pub fn py_str(text: &str) -> String {
    format!("\"{}\"", escape_py_string(text))
}

/// Python float literal (`1.0`, `-2.5`, `1e21`, `float("inf")`).
pub fn py_float(value: f64) -> String {
    if value.is_nan() {
        return "float(\"nan\")".to_string();
    }
    if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("float(\"{sign}inf\")");
    }
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value:?}")
}

/// Layout coordinate rounded to two decimals.
pub fn coord(value: f64) -> String {
    py_float((value * 100.0).round() / 100.0)
}
