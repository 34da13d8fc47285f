//! Scene compiler: typed scene specifications to Manim scripts.
//!
//! [`SceneRequest::from_value`] reads untrusted `sceneParams` JSON into a
//! closed [`SceneSpec`] enum without ever failing, and [`compile`] turns a
//! spec into script text. Both are pure and deterministic.

pub mod dfa;
pub mod diagram;
pub mod escape;
pub mod graph;
pub mod list;
pub mod quadratic;
pub mod script;
pub mod text;
pub mod topology;
pub mod value;

use serde_json::{Map, Value};

use self::dfa::DfaParams;
use self::diagram::DiagramParams;
use self::escape::derive_title;
use self::graph::GraphParams;
use self::list::ListParams;
use self::quadratic::QuadraticParams;
use self::text::TextParams;
use self::topology::{EdgeSpec, NodeSpec};

pub use self::script::SCENE_CLASS;

// ---------------------------------------------------------------------------
// Scene specification
// ---------------------------------------------------------------------------

/// Closed set of scene kinds, each with its own parameter shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneSpec {
    Text(TextParams),
    List(ListParams),
    Dfa(DfaParams),
    Diagram(DiagramParams),
    Quadratic(QuadraticParams),
    Graph(GraphParams),
    /// Missing or unrecognised `sceneType`: a three-node topic diagram.
    Fallback,
}

impl SceneSpec {
    /// Dispatch on `scene_type` (trimmed, case-insensitive).
    pub fn from_parts(scene_type: Option<&str>, params: &Map<String, Value>) -> Self {
        let kind = scene_type.map(|t| t.trim().to_ascii_lowercase());
        match kind.as_deref() {
            Some("text") => Self::Text(TextParams::from_params(params)),
            Some("list") => Self::List(ListParams::from_params(params)),
            Some("dfa") => Self::Dfa(DfaParams::from_params(params)),
            Some("diagram") => Self::Diagram(DiagramParams::from_params(params)),
            Some("quadratic") => Self::Quadratic(QuadraticParams::from_params(params)),
            Some("graph") => Self::Graph(GraphParams::from_params(params)),
            _ => Self::Fallback,
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Dfa(_) => "dfa",
            Self::Diagram(_) => "diagram",
            Self::Quadratic(_) => "quadratic",
            Self::Graph(_) => "graph",
            Self::Fallback => "fallback",
        }
    }
}

/// Parsed `sceneParams`: optional explicit title plus the scene spec.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneRequest {
    pub title: Option<String>,
    pub spec: SceneSpec,
}

impl SceneRequest {
    /// Read `{ sceneType, title?, params }`. Absent or malformed input
    /// yields the fallback scene, never an error.
    pub fn from_value(scene_params: Option<&Value>) -> Self {
        let empty = Map::new();
        let Some(obj) = value::as_object(scene_params) else {
            return Self {
                title: None,
                spec: SceneSpec::Fallback,
            };
        };
        let params = value::as_object(obj.get("params")).unwrap_or(&empty);
        Self {
            title: obj.get("title").and_then(Value::as_str).map(str::to_string),
            spec: SceneSpec::from_parts(obj.get("sceneType").and_then(Value::as_str), params),
        }
    }
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

/// Output of [`compile_params`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledScene {
    pub title: String,
    pub kind: &'static str,
    pub script: String,
}

/// The diagram used for [`SceneSpec::Fallback`].
pub fn fallback_diagram(title: &str) -> DiagramParams {
    DiagramParams {
        nodes: vec![
            NodeSpec::new("topic", title),
            NodeSpec::new("idea1", "Key Idea 1"),
            NodeSpec::new("idea2", "Key Idea 2"),
        ],
        edges: vec![
            EdgeSpec::new("topic", "idea1", Some("relates to")),
            EdgeSpec::new("topic", "idea2", Some("includes")),
        ],
    }
}

/// Render `spec` as a Manim script titled `title`.
pub fn compile(title: &str, spec: &SceneSpec) -> String {
    match spec {
        SceneSpec::Text(p) => text::build(title, p.content.as_deref().unwrap_or(title)),
        SceneSpec::List(p) => list::build(title, p),
        SceneSpec::Dfa(p) => dfa::build(title, p),
        SceneSpec::Diagram(p) => diagram::build(title, p),
        SceneSpec::Quadratic(p) => quadratic::build(title, p),
        SceneSpec::Graph(p) => graph::build(title, p),
        SceneSpec::Fallback => diagram::build(title, &fallback_diagram(title)),
    }
}

/// Derive the title from `prompt` / `sceneParams.title`, parse the scene spec,
/// and compile it.
pub fn compile_params(prompt: Option<&str>, scene_params: Option<&Value>) -> CompiledScene {
    let request = SceneRequest::from_value(scene_params);
    let title = derive_title(prompt, request.title.as_deref());
    let script = compile(&title, &request.spec);
    CompiledScene {
        title,
        kind: request.spec.kind(),
        script,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    /// Check every line closes the double-quoted literals it opens and
    /// return the decoded literal contents.
    fn string_literals(script: &str) -> Vec<String> {
        let mut literals = Vec::new();
        for (n, line) in script.lines().enumerate() {
            let mut chars = line.chars();
            let mut current: Option<String> = None;
            while let Some(c) = chars.next() {
                match current.as_mut() {
                    None => match c {
                        '#' => break,
                        '"' => current = Some(String::new()),
                        _ => {}
                    },
                    Some(lit) => match c {
                        '\\' => match chars.next() {
                            Some('n') => lit.push('\n'),
                            Some(other) => lit.push(other),
                            None => panic!("line {n} ends inside an escape: {line}"),
                        },
                        '"' => literals.push(current.take().unwrap_or_default()),
                        other => lit.push(other),
                    },
                }
            }
            assert!(current.is_none(), "line {n} leaves a literal open: {line}");
        }
        literals
    }

    // -- Dispatch --

    #[test]
    fn dispatch_is_case_insensitive() {
        let req = SceneRequest::from_value(Some(&json!({"sceneType": " LIST ", "params": {}})));
        assert_matches!(req.spec, SceneSpec::List(_));
        let req = SceneRequest::from_value(Some(&json!({"sceneType": "Quadratic"})));
        assert_matches!(req.spec, SceneSpec::Quadratic(_));
    }

    #[test]
    fn malformed_input_is_fallback() {
        for input in [
            None,
            Some(json!(null)),
            Some(json!("list")),
            Some(json!([1, 2])),
            Some(json!({"sceneType": 5})),
            Some(json!({"sceneType": "bogus"})),
            Some(json!({"sceneType": "triangle", "params": {"labels": {}}})),
        ] {
            let req = SceneRequest::from_value(input.as_ref());
            assert_eq!(req.spec, SceneSpec::Fallback, "input: {input:?}");
        }
    }

    #[test]
    fn non_object_params_read_as_empty() {
        let req = SceneRequest::from_value(Some(&json!({"sceneType": "list", "params": [1]})));
        assert_eq!(req.spec, SceneSpec::List(ListParams::default()));
    }

    // -- Determinism --

    #[test]
    fn compilation_is_deterministic() {
        let params = json!({
            "sceneType": "graph",
            "title": "Sine and cosine",
            "params": {
                "functions": [{"expr": "sin(x)"}, {"expr": "cos(x)"}],
                "xRange": [-3.14, 3.14],
                "notes": ["periodic"]
            }
        });
        let first = compile_params(Some("prompt"), Some(&params));
        let second = compile_params(Some("prompt"), Some(&params));
        assert_eq!(first.script, second.script);
        assert_eq!(first.title, "Sine and cosine");
        assert_eq!(first.kind, "graph");
    }

    // -- Fallbacks --

    #[test]
    fn fallback_scenes_are_never_empty() {
        let cases = [
            None,
            Some(json!({"sceneType": "bogus"})),
            Some(json!({"sceneType": "diagram", "params": {"nodes": []}})),
            Some(json!({"sceneType": "dfa", "params": {}})),
        ];
        for case in cases {
            let compiled = compile_params(Some("Explain things"), case.as_ref());
            assert!(!compiled.script.trim().is_empty());
            assert!(compiled.script.contains("class GeneratedScene(Scene):"));
            assert!(compiled.script.ends_with("self.wait(2)\n"));
            string_literals(&compiled.script);
        }
    }

    #[test]
    fn default_diagram_uses_title_and_key_ideas() {
        let compiled = compile_params(Some("Photosynthesis\nmore detail"), None);
        assert_eq!(compiled.kind, "fallback");
        let literals = string_literals(&compiled.script);
        assert!(literals.contains(&"Photosynthesis".to_string()));
        assert!(literals.contains(&"Key Idea 1".to_string()));
        assert!(literals.contains(&"Key Idea 2".to_string()));
        assert!(literals.contains(&"relates to".to_string()));
        assert!(literals.contains(&"includes".to_string()));
        assert_eq!(compiled.script.matches("self.play(FadeIn(n").count(), 3);
    }

    // -- Escaping --

    #[test]
    fn hostile_text_stays_inside_literals() {
        let hostile = "\"), __import__('os').system('rm -rf /'), Text(\"\\";
        let params = json!({
            "sceneType": "diagram",
            "params": {
                "nodes": [
                    {"id": hostile, "label": hostile},
                    {"id": "b", "label": "line one\nline two"}
                ],
                "edges": [{"from": hostile, "to": "b", "label": hostile}]
            }
        });
        let compiled = compile_params(Some("Injection"), Some(&params));
        let literals = string_literals(&compiled.script);
        assert_eq!(literals.iter().filter(|l| l.as_str() == hostile).count(), 2);
        assert!(literals.contains(&"line one\nline two".to_string()));
        for line in compiled.script.lines() {
            if !line.contains('"') {
                assert!(!line.contains("__import__"), "leaked into code: {line}");
            }
        }
    }

    #[test]
    fn title_quotes_are_stripped() {
        let compiled = compile_params(Some("Say \"hi\" it's me"), None);
        assert_eq!(compiled.title, "Say hi its me");
    }

    #[test]
    fn every_scene_kind_produces_balanced_literals() {
        let cases = [
            json!({"sceneType": "text", "params": {"content": "a \\ b\n\"c\""}}),
            json!({"sceneType": "list", "params": {"items": ["x\"y", "z\\"]}}),
            json!({"sceneType": "dfa", "params": {
                "nodes": [{"id": "q\"0", "label": "q\\0", "start": true, "accept": true}],
                "edges": [{"from": "q\"0", "to": "q\"0", "label": "\\"}],
                "explanation": "ends \"here\""
            }}),
            json!({"sceneType": "quadratic", "params": {"a": 2, "b": "0", "c": -1}}),
            json!({"sceneType": "graph", "params": {"functions": [{"expr": "\"", "label": "\\"}], "notes": ["\""]}}),
        ];
        for case in cases {
            let compiled = compile_params(Some("T \\ \""), Some(&case));
            string_literals(&compiled.script);
        }
    }

    // -- End-to-end shapes --

    #[test]
    fn list_of_three_items() {
        let params = json!({"sceneType": "list", "params": {"items": ["A", "B", "C"]}});
        let compiled = compile_params(Some("Steps"), Some(&params));
        let script = &compiled.script;

        let writes: Vec<&str> = script.lines().filter(|l| l.contains("Write(")).collect();
        assert_eq!(writes.len(), 4);
        assert_eq!(writes[0].trim(), "self.play(Write(title))");
        assert_eq!(
            script.lines().filter(|l| l.contains("Text(\"• ")).count(),
            3
        );
        for (i, item) in ["A", "B", "C"].iter().enumerate() {
            assert!(script.contains(&format!("it{i} = Text(\"• {item}\"")));
            assert_eq!(writes[i + 1].trim(), format!("self.play(Write(it{i}))"));
        }
    }

    #[test]
    fn quadratic_with_bad_coefficient_uses_default_triple() {
        let params = json!({"sceneType": "quadratic", "params": {"a": "x", "b": 2, "c": 3}});
        let script = compile_params(None, Some(&params)).script;
        assert!(script.contains("a = 1.0\n"));
        assert!(script.contains("b = -3.0\n"));
        assert!(script.contains("c = -4.0\n"));
    }

    #[test]
    fn unsupported_graph_expression_is_identity() {
        let params = json!({"sceneType": "graph", "params": {"functions": [{"expr": "tan(x)"}]}});
        let script = compile_params(None, Some(&params)).script;
        assert!(script.contains("f0 = lambda x: x\n"));
        assert!(!script.contains("tan(x))"));
    }

    #[test]
    fn text_without_content_uses_title() {
        let params = json!({"sceneType": "text"});
        let script = compile_params(Some("Hello world"), Some(&params)).script;
        assert!(script.contains("t0 = Text(\"Hello world\", font_size=34)"));
    }
}
