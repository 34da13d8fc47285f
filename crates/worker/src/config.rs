use std::path::PathBuf;
use std::time::Duration;

use manim_cloud::S3Settings;

use crate::error::ConfigError;

/// Which renderer backend the worker drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    /// The real `manim` CLI.
    Manim,
    /// Writes an empty artifact after a delay. For local development and CI.
    Mock,
}

/// Worker configuration loaded from environment variables.
///
/// All fields have defaults that match the layout the submission side
/// writes to, so a bare `manim-worker` in the project root just works.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Directory scanned for job descriptors.
    pub job_dir: PathBuf,
    /// Descriptor file name prefix (`<prefix>-*.json`).
    pub job_prefix: String,
    /// Root of the per-job working directories.
    pub work_dir: PathBuf,
    /// Where rendered videos are written.
    pub output_dir: PathBuf,
    /// URL path under which `output_dir` is served.
    pub public_prefix: String,
    /// Sleep between scans when nothing is queued.
    pub poll_interval: Duration,
    pub renderer: RendererKind,
    /// Renderer executable for [`RendererKind::Manim`].
    pub manim_bin: String,
    /// Kill the renderer after this long. `None` waits indefinitely.
    pub render_timeout: Option<Duration>,
    /// Simulated render time for [`RendererKind::Mock`].
    pub mock_delay: Duration,
    /// Remote upload target. `None` serves artifacts from `output_dir`.
    pub s3: Option<S3Settings>,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default               |
    /// |-----------------------------|-----------------------|
    /// | `MANIM_JOB_DIR`             | `manim_jobs`          |
    /// | `MANIM_JOB_PREFIX`          | `manim`               |
    /// | `MANIM_WORK_DIR`            | value of job dir      |
    /// | `MANIM_OUTPUT_DIR`          | `public/manim_videos` |
    /// | `MANIM_PUBLIC_PREFIX`       | `/manim_videos`       |
    /// | `MANIM_POLL_INTERVAL_SECS`  | `2`                   |
    /// | `MANIM_RENDERER`            | `manim` (or `mock`)   |
    /// | `MANIM_BIN`                 | `manim`               |
    /// | `MANIM_RENDER_TIMEOUT_SECS` | unset (no timeout)    |
    /// | `MANIM_MOCK_DELAY_MS`       | `2000`                |
    ///
    /// S3 settings come from [`S3Settings::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let job_dir = PathBuf::from(get("MANIM_JOB_DIR").unwrap_or_else(|| "manim_jobs".into()));
        let job_prefix = get("MANIM_JOB_PREFIX").unwrap_or_else(|| "manim".into());
        let work_dir = get("MANIM_WORK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| job_dir.clone());
        let output_dir = PathBuf::from(
            get("MANIM_OUTPUT_DIR").unwrap_or_else(|| "public/manim_videos".into()),
        );
        let public_prefix = get("MANIM_PUBLIC_PREFIX")
            .unwrap_or_else(|| "/manim_videos".into())
            .trim_end_matches('/')
            .to_string();

        let poll_interval = Duration::from_secs(positive_u64(
            "MANIM_POLL_INTERVAL_SECS",
            get("MANIM_POLL_INTERVAL_SECS"),
            2,
        )?);

        let renderer = match get("MANIM_RENDERER") {
            None => RendererKind::Manim,
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "manim" => RendererKind::Manim,
                "mock" => RendererKind::Mock,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "MANIM_RENDERER",
                        value,
                        reason: "expected `manim` or `mock`",
                    })
                }
            },
        };

        let manim_bin = get("MANIM_BIN").unwrap_or_else(|| "manim".into());

        let render_timeout = match get("MANIM_RENDER_TIMEOUT_SECS") {
            None => None,
            raw @ Some(_) => Some(Duration::from_secs(positive_u64(
                "MANIM_RENDER_TIMEOUT_SECS",
                raw,
                0,
            )?)),
        };

        let mock_delay = match get("MANIM_MOCK_DELAY_MS") {
            None => Duration::from_millis(2000),
            Some(value) => match value.parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    return Err(ConfigError::Invalid {
                        var: "MANIM_MOCK_DELAY_MS",
                        value,
                        reason: "expected a whole number of milliseconds",
                    })
                }
            },
        };

        Ok(Self {
            job_dir,
            job_prefix,
            work_dir,
            output_dir,
            public_prefix,
            poll_interval,
            renderer,
            manim_bin,
            render_timeout,
            mock_delay,
            s3: S3Settings::from_vars(&lookup),
        })
    }
}

fn positive_u64(var: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let Some(value) = raw else {
        return Ok(default);
    };
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid {
            var,
            value,
            reason: "expected a positive whole number of seconds",
        }),
    }
}
