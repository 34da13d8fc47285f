//! Function graph scene.
//!
//! Plotted expressions come from a closed whitelist ([`GraphExpr`]). The
//! submitted expression text is matched against it at compile time and is
//! only ever emitted as label text, never as code.

use serde_json::{Map, Value};

use super::script::{coord, py_float, py_str, Script};
use super::value::{array_field, coerce_f64, flag, scalar_text, text_field};

/// Maximum number of plotted functions.
pub const MAX_FUNCTIONS: usize = 2;

/// Maximum number of notes shown under the plot.
pub const MAX_NOTES: usize = 2;

/// Roughly this many ticks are drawn per axis.
const TARGET_TICKS: f64 = 12.0;

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// Plottable expressions. Anything unrecognised plots as [`GraphExpr::Identity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphExpr {
    Identity,
    Square,
    Sin,
    Cos,
    Negate,
}

impl GraphExpr {
    /// Match submitted expression text, ignoring case and surrounding space.
    pub fn from_expr(expr: &str) -> Self {
        match expr.trim().to_ascii_lowercase().as_str() {
            "x" | "y=x" => Self::Identity,
            "x^2" | "x**2" => Self::Square,
            "sin(x)" | "sin" => Self::Sin,
            "cos(x)" | "cos" => Self::Cos,
            "-x" => Self::Negate,
            _ => Self::Identity,
        }
    }

    /// Body of the lambda emitted for this expression.
    pub fn lambda_body(self) -> &'static str {
        match self {
            Self::Identity => "x",
            Self::Square => "x*x",
            Self::Sin => "np.sin(x)",
            Self::Cos => "np.cos(x)",
            Self::Negate => "-x",
        }
    }
}

/// One plotted function and its caption.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotFunction {
    pub expr: GraphExpr,
    pub label: String,
}

impl PlotFunction {
    fn identity() -> Self {
        Self {
            expr: GraphExpr::Identity,
            label: "y=x".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Ranges
// ---------------------------------------------------------------------------

/// Closed interval shown on one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub const DEFAULT: Self = Self {
        min: -6.0,
        max: 6.0,
    };

    /// Two numeric, increasing values with a finite span; anything else is
    /// [`AxisRange::DEFAULT`].
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some([lo, hi]) = value.and_then(Value::as_array).map(Vec::as_slice) else {
            return Self::DEFAULT;
        };
        match (coerce_f64(lo), coerce_f64(hi)) {
            (Some(min), Some(max)) if min < max && (max - min).is_finite() => Self { min, max },
            _ => Self::DEFAULT,
        }
    }

    /// Tick spacing keeping about [`TARGET_TICKS`] ticks on the axis.
    fn tick_step(self) -> f64 {
        ((self.max - self.min) / TARGET_TICKS).ceil().max(1.0)
    }

    fn axes_arg(self) -> String {
        format!(
            "[{}, {}, {}]",
            py_float(self.min),
            py_float(self.max),
            py_float(self.tick_step())
        )
    }
}

impl Default for AxisRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ---------------------------------------------------------------------------
// Params
// ---------------------------------------------------------------------------

/// Parameters for the `graph` scene kind.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphParams {
    pub functions: Vec<PlotFunction>,
    pub x_range: AxisRange,
    pub y_range: AxisRange,
    pub show_axes: bool,
    pub notes: Vec<String>,
}

impl Default for GraphParams {
    fn default() -> Self {
        Self {
            functions: vec![PlotFunction::identity()],
            x_range: AxisRange::DEFAULT,
            y_range: AxisRange::DEFAULT,
            show_axes: true,
            notes: Vec::new(),
        }
    }
}

impl GraphParams {
    pub fn from_params(params: &Map<String, Value>) -> Self {
        let mut functions: Vec<PlotFunction> = array_field(params, "functions")
            .iter()
            .filter_map(|v| {
                let (expr, label) = match v {
                    Value::Object(obj) => {
                        let expr = text_field(obj, "expr").unwrap_or_else(|| "x".to_string());
                        let label = text_field(obj, "label").unwrap_or_else(|| expr.clone());
                        (expr, label)
                    }
                    Value::String(s) if !s.is_empty() => (s.clone(), s.clone()),
                    _ => return None,
                };
                Some(PlotFunction {
                    expr: GraphExpr::from_expr(&expr),
                    label,
                })
            })
            .take(MAX_FUNCTIONS)
            .collect();
        if functions.is_empty() {
            functions.push(PlotFunction::identity());
        }

        let notes = array_field(params, "notes")
            .iter()
            .take(MAX_NOTES)
            .map(|v| scalar_text(v).unwrap_or_else(|| v.to_string()))
            .collect();

        Self {
            functions,
            x_range: AxisRange::from_value(params.get("xRange")),
            y_range: AxisRange::from_value(params.get("yRange")),
            show_axes: flag(params, "showAxes", true),
            notes,
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

pub fn build(title: &str, params: &GraphParams) -> String {
    let mut script = Script::new(title, true);
    let x = params.x_range;
    let y = params.y_range;

    script.stmt(format!(
        "axes = Axes(x_range={}, y_range={}, x_length=10, y_length=5, tips=False).shift(DOWN*0.5)",
        x.axes_arg(),
        y.axes_arg()
    ));
    if params.show_axes {
        script.stmt("self.play(Create(axes))");
    }
    script.blank();

    for (i, function) in params.functions.iter().take(MAX_FUNCTIONS).enumerate() {
        script.stmt(format!("f{i} = lambda x: {}", function.expr.lambda_body()));
        script.stmt(format!(
            "g{i} = axes.plot(f{i}, x_range=[{}, {}], use_smoothing=True)",
            py_float(x.min),
            py_float(x.max)
        ));
        script.stmt(format!("self.play(Create(g{i}))"));
        script.stmt(format!(
            "lbl{i} = Text({}, font_size=24).to_edge(DOWN).shift(UP*{})",
            py_str(&function.label),
            coord(0.4 + 0.45 * i as f64)
        ));
        script.stmt(format!("self.play(Write(lbl{i}))"));
    }

    if !params.notes.is_empty() {
        let joined = params
            .notes
            .iter()
            .take(MAX_NOTES)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" | ");
        script.blank();
        script.stmt(format!("note = Text({}, font_size=26).to_edge(DOWN)", py_str(&joined)));
        script.stmt("self.play(Write(note))");
    }

    script.finish()
}
