use std::path::PathBuf;

use manim_cloud::UploadError;
use manim_core::error::CoreError;
use manim_store::StoreError;

use crate::renderer::RenderError;

/// Invalid worker configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Failure while processing a claimed job.
///
/// Never escapes the executor: every variant ends up as the descriptor's
/// `error` text.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Invalid job: {0}")]
    Invalid(#[from] CoreError),

    #[error("Failed to prepare {}: {source}", path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("S3 upload failed: {0}")]
    Upload(#[from] UploadError),
}

impl JobError {
    pub(crate) fn workspace(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Workspace {
            path: path.into(),
            source,
        }
    }
}

/// Errors that stop the worker.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to create {}: {source}", path.display())]
    Setup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Job store error: {0}")]
    Store(#[from] StoreError),

    #[error("Job state error: {0}")]
    State(#[from] CoreError),
}
