use std::path::PathBuf;

/// Errors raised while uploading an artifact.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Cannot read artifact {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    #[error("Upload of {key} to bucket {bucket} failed: {message}")]
    Request {
        bucket: String,
        key: String,
        message: String,
    },
}
