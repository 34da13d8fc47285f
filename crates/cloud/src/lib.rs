//! Remote storage for rendered artifacts.
//!
//! The worker only sees [`ArtifactUploader`]; [`S3Uploader`] is the one
//! production implementation.

pub mod error;
pub mod s3;

use std::path::Path;

use async_trait::async_trait;

pub use error::UploadError;
pub use s3::{S3Settings, S3Uploader};

/// Key prefix under which rendered videos are stored remotely.
pub const VIDEO_KEY_PREFIX: &str = "manim_videos";

/// Pushes a local artifact to remote storage and returns its public URL.
#[async_trait]
pub trait ArtifactUploader: Send + Sync {
    async fn upload(&self, local_path: &Path, key: &str) -> Result<String, UploadError>;
}

/// Object key for a job's rendered video.
pub fn video_object_key(job_id: &str) -> String {
    format!("{VIDEO_KEY_PREFIX}/{job_id}.mp4")
}
