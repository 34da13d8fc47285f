use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;

use super::subprocess::{run_command, tail};
use super::{RenderError, RenderRequest, Renderer};

/// Characters of stderr kept in a failure message.
const STDERR_TAIL_CHARS: usize = 2000;

/// Drives the Manim CLI:
/// `<program> <script> <SceneClass> -q<l|m|h|k> --format mp4 -o <output>`.
#[derive(Debug, Clone)]
pub struct ManimRenderer {
    program: String,
    timeout: Option<Duration>,
}

impl ManimRenderer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// CLI arguments for `request`.
    ///
    /// The child runs inside the job's working directory, so relative
    /// paths are resolved against the worker's own directory first.
    pub fn args(request: &RenderRequest) -> Result<Vec<OsString>, RenderError> {
        Ok(vec![
            absolute(&request.script_path)?.into_os_string(),
            request.scene_class.into(),
            request.quality.cli_flag().into(),
            "--format".into(),
            "mp4".into(),
            "-o".into(),
            absolute(&request.output_path)?.into_os_string(),
        ])
    }
}

fn absolute(path: &Path) -> Result<PathBuf, RenderError> {
    Ok(std::path::absolute(path)?)
}

impl Renderer for ManimRenderer {
    async fn render(&self, request: &RenderRequest) -> Result<(), RenderError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(Self::args(request)?)
            .current_dir(&request.working_dir);

        tracing::info!(
            program = %self.program,
            script = %request.script_path.display(),
            output = %request.output_path.display(),
            quality = request.quality.cli_flag(),
            "Starting renderer",
        );

        let output = run_command(&mut cmd, &self.program, self.timeout).await?;

        if output.exit_code != 0 {
            tracing::debug!(stdout = %tail(&output.stdout, STDERR_TAIL_CHARS), "Renderer stdout");
            return Err(RenderError::ExecutionFailed {
                exit_code: output.exit_code,
                stderr: tail(&output.stderr, STDERR_TAIL_CHARS),
            });
        }

        tracing::info!(duration_ms = output.duration_ms, "Renderer finished");
        Ok(())
    }
}
