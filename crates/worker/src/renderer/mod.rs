//! Renderer adapters.
//!
//! A [`Renderer`] turns a generated script into a video file at a given
//! path. [`ManimRenderer`](manim::ManimRenderer) shells out to the Manim
//! CLI; [`MockRenderer`](mock::MockRenderer) fakes it for development.

pub mod manim;
pub mod mock;
mod subprocess;

use std::future::Future;
use std::path::PathBuf;

use manim_core::job::RenderQuality;

use crate::config::{RendererKind, WorkerConfig};

pub use self::manim::ManimRenderer;
pub use self::mock::MockRenderer;

/// Everything a renderer needs for one job.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub script_path: PathBuf,
    /// Scene class defined by the script.
    pub scene_class: &'static str,
    pub quality: RenderQuality,
    /// Where the finished video must end up.
    pub output_path: PathBuf,
    /// Working directory for the renderer process.
    pub working_dir: PathBuf,
}

/// Errors that can occur while rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to start renderer `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Renderer exited with code {exit_code}: {stderr}")]
    ExecutionFailed { exit_code: i32, stderr: String },

    #[error("Renderer timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("Renderer I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders a script to a video file.
pub trait Renderer: Send + Sync {
    /// Render `request.script_path` into `request.output_path`. A non-zero
    /// exit status is the only failure signal; output is kept for
    /// diagnostics, never parsed.
    fn render(
        &self,
        request: &RenderRequest,
    ) -> impl Future<Output = Result<(), RenderError>> + Send;
}

/// Renderer selected at startup.
#[derive(Debug, Clone)]
pub enum ConfiguredRenderer {
    Manim(ManimRenderer),
    Mock(MockRenderer),
}

impl ConfiguredRenderer {
    pub fn from_config(config: &WorkerConfig) -> Self {
        match config.renderer {
            RendererKind::Manim => Self::Manim(
                ManimRenderer::new(config.manim_bin.clone()).with_timeout(config.render_timeout),
            ),
            RendererKind::Mock => Self::Mock(MockRenderer::new(config.mock_delay)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Manim(_) => "manim",
            Self::Mock(_) => "mock",
        }
    }
}

impl Renderer for ConfiguredRenderer {
    async fn render(&self, request: &RenderRequest) -> Result<(), RenderError> {
        match self {
            Self::Manim(r) => r.render(request).await,
            Self::Mock(r) => r.render(request).await,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
