//! Child process execution for renderer backends.
//!
//! The caller builds the [`Command`] (program, args, working directory);
//! [`run_command`] handles stdio capture and the optional timeout.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use super::RenderError;

/// Maximum stdout or stderr size captured per stream (10 MiB).
const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Captured result of a finished child process.
#[derive(Debug, Clone)]
pub(crate) struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// Process exit code (`-1` if killed by signal).
    pub exit_code: i32,
    pub duration_ms: u64,
}

/// Spawn `cmd`, capture its output, and wait up to `timeout`.
pub(crate) async fn run_command(
    cmd: &mut Command,
    program: &str,
    timeout: Option<Duration>,
) -> Result<ProcessOutput, RenderError> {
    // `kill_on_drop(true)` so a timed-out child dies with its handle.
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let start = Instant::now();

    let mut child = cmd.spawn().map_err(|source| RenderError::Spawn {
        program: program.to_string(),
        source,
    })?;

    // Read both streams in tasks so `child.wait()` can borrow `child`.
    let stdout_handle = child.stdout.take();
    let stderr_handle = child.stderr.take();
    let stdout_task = tokio::spawn(async move { read_stream(stdout_handle).await });
    let stderr_task = tokio::spawn(async move { read_stream(stderr_handle).await });

    let status = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(status) => status?,
            Err(_elapsed) => {
                return Err(RenderError::Timeout {
                    elapsed_ms: start.elapsed().as_millis() as u64,
                });
            }
        },
        None => child.wait().await?,
    };

    let stdout_bytes = stdout_task.await.unwrap_or_default();
    let stderr_bytes = stderr_task.await.unwrap_or_default();

    Ok(ProcessOutput {
        stdout: String::from_utf8_lossy(&stdout_bytes).into_owned(),
        stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
        exit_code: status.code().unwrap_or(-1),
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Read an entire output stream, capped at [`MAX_OUTPUT_BYTES`].
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    match handle {
        Some(mut h) => read_capped(&mut h, MAX_OUTPUT_BYTES).await,
        None => Vec::new(),
    }
}

/// Keep the first `cap` bytes of `reader` and discard the rest.
///
/// The stream is read to EOF so a chatty child never blocks on a full pipe.
async fn read_capped<R: AsyncRead + Unpin>(reader: &mut R, cap: usize) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Err(e) = (&mut *reader).take(cap as u64).read_to_end(&mut buf).await {
        tracing::debug!(error = %e, "Child output stream closed with error");
        return buf;
    }
    if let Err(e) = tokio::io::copy(reader, &mut tokio::io::sink()).await {
        tracing::debug!(error = %e, "Failed to drain child output past the cap");
    }
    buf
}

/// Last `max_chars` characters of `text`, trimmed.
pub(crate) fn tail(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    let count = trimmed.chars().count();
    if count <= max_chars {
        return trimmed.to_string();
    }
    let skipped: String = trimmed.chars().skip(count - max_chars).collect();
    format!("...{skipped}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_keeps_short_text() {
        assert_eq!(tail("  oops \n", 10), "oops");
    }

    #[test]
    fn tail_truncates_from_the_front() {
        assert_eq!(tail("abcdefghij", 3), "...hij");
    }

    #[tokio::test]
    async fn output_past_the_cap_is_drained_and_dropped() {
        let data = vec![b'x'; 5000];
        let mut reader: &[u8] = &data;
        let kept = read_capped(&mut reader, 100).await;
        assert_eq!(kept.len(), 100);
        assert!(reader.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_output_and_exit_code() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo out; echo err >&2; exit 3"]);
        let output = run_command(&mut cmd, "sh", None).await.unwrap();
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
        assert_eq!(output.exit_code, 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timeout_kills_child() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "sleep 5"]);
        let result = run_command(&mut cmd, "sh", Some(Duration::from_millis(100))).await;
        assert!(matches!(result, Err(RenderError::Timeout { .. })));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let mut cmd = Command::new("/nonexistent/manim-renderer");
        let result = run_command(&mut cmd, "/nonexistent/manim-renderer", None).await;
        assert!(matches!(result, Err(RenderError::Spawn { .. })));
    }
}
