//! Quadratic scene: `y = ax^2 + bx + c` on fixed axes, with its vertex.

use serde_json::{Map, Value};

use super::script::{py_float, py_str, Script};
use super::value::{coerce_f64, flag};

/// Coefficients of `y = ax^2 + bx + c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Coefficients {
    /// Used whenever any supplied coefficient fails numeric coercion.
    pub const DEFAULT: Self = Self {
        a: 1.0,
        b: -3.0,
        c: -4.0,
    };

    pub fn eval(self, x: f64) -> f64 {
        self.a * x * x + self.b * x + self.c
    }

    /// Vertex `(x, y)`; `None` for a degenerate (linear) curve.
    pub fn vertex(self) -> Option<(f64, f64)> {
        if self.a == 0.0 {
            return None;
        }
        let x = -self.b / (2.0 * self.a);
        let y = self.eval(x);
        (x.is_finite() && y.is_finite()).then_some((x, y))
    }

    /// Display formula with `+ -` folded into `- `.
    pub fn formula(self) -> String {
        format!(
            "y = {}x^2 + {}x + {}",
            py_float(self.a),
            py_float(self.b),
            py_float(self.c)
        )
        .replace("+ -", "- ")
    }
}

impl Default for Coefficients {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Parameters for the `quadratic` scene kind.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticParams {
    pub coefficients: Coefficients,
    pub show_formula: bool,
}

impl Default for QuadraticParams {
    fn default() -> Self {
        Self {
            coefficients: Coefficients::DEFAULT,
            show_formula: true,
        }
    }
}

impl QuadraticParams {
    /// Missing coefficients take their individual default; a present but
    /// non-numeric one replaces the whole triple with [`Coefficients::DEFAULT`].
    /// Booleans count as numeric.
    pub fn from_params(params: &Map<String, Value>) -> Self {
        let read = |key: &str, default: f64| match params.get(key) {
            None => Some(default),
            Some(v) => coerce_f64(v),
        };
        let d = Coefficients::DEFAULT;
        let coefficients = match (read("a", d.a), read("b", d.b), read("c", d.c)) {
            (Some(a), Some(b), Some(c)) => Coefficients { a, b, c },
            _ => Coefficients::DEFAULT,
        };
        Self {
            coefficients,
            show_formula: flag(params, "showFormula", true),
        }
    }
}

pub fn build(title: &str, params: &QuadraticParams) -> String {
    let k = params.coefficients;
    let mut script = Script::new(title, false);

    script.stmt(
        "axes = Axes(x_range=[-6, 6, 1], y_range=[-6, 6, 1], x_length=10, y_length=5, tips=False).shift(DOWN*0.5)",
    );
    script.stmt("self.play(Create(axes))");
    script.blank();
    script.stmt(format!("a = {}", py_float(k.a)));
    script.stmt(format!("b = {}", py_float(k.b)));
    script.stmt(format!("c = {}", py_float(k.c)));
    script.stmt("graph = axes.plot(lambda x: a*x*x + b*x + c, x_range=[-6, 6], use_smoothing=True)");
    script.stmt("self.play(Create(graph))");

    if params.show_formula {
        script.blank();
        script.stmt(format!(
            "formula = MathTex({}).scale(0.9).to_edge(DOWN)",
            py_str(&k.formula())
        ));
        script.stmt("self.play(Write(formula))");
    }

    if let Some((xv, yv)) = k.vertex() {
        script.blank();
        script.comment("Vertex");
        script.stmt(format!(
            "v_dot = Dot(axes.coords_to_point({}, {}))",
            py_float(xv),
            py_float(yv)
        ));
        script.stmt("v_lbl = Text(\"Vertex\", font_size=24).next_to(v_dot, UP)");
        script.stmt("self.play(FadeIn(v_dot), Write(v_lbl))");
    }

    script.finish()
}
