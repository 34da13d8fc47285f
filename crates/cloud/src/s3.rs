//! S3 artifact upload.
//!
//! Environment variables (read by [`S3Settings::from_env`]):
//!
//! | Variable                | Required | Notes                                 |
//! |-------------------------|----------|---------------------------------------|
//! | `AWS_S3_BUCKET`         | no       | Enables upload; `AWS_BUCKET` fallback |
//! | `AWS_REGION`            | no       | SDK default chain when unset          |
//! | `AWS_ACCESS_KEY_ID`     | no       | Static credentials, with secret below |
//! | `AWS_SECRET_ACCESS_KEY` | no       |                                       |

use std::path::Path;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;

use crate::error::UploadError;
use crate::ArtifactUploader;

/// Content type attached to uploaded videos.
const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Connection settings for [`S3Uploader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    pub bucket: String,
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl S3Settings {
    /// Read settings from the process environment. `None` when no bucket is
    /// configured, which disables remote upload.
    pub fn from_env() -> Option<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup. Blank values count
    /// as unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let bucket = get("AWS_S3_BUCKET").or_else(|| get("AWS_BUCKET"))?;
        Some(Self {
            bucket,
            region: get("AWS_REGION"),
            access_key_id: get("AWS_ACCESS_KEY_ID"),
            secret_access_key: get("AWS_SECRET_ACCESS_KEY"),
        })
    }

    fn static_credentials(&self) -> Option<Credentials> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(id), Some(secret)) => Some(Credentials::new(
                id.clone(),
                secret.clone(),
                None,
                None,
                "manim-worker-env",
            )),
            _ => None,
        }
    }
}

/// Public URL of an object in a bucket using the virtual-hosted style.
pub fn public_url(bucket: &str, key: &str) -> String {
    format!("https://{bucket}.s3.amazonaws.com/{key}")
}

/// Uploads artifacts with a `public-read` ACL.
pub struct S3Uploader {
    client: Client,
    bucket: String,
}

impl S3Uploader {
    /// Build a client from `settings`, falling back to the SDK default
    /// provider chain for anything not set explicitly.
    pub async fn connect(settings: &S3Settings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(credentials) = settings.static_credentials() {
            loader = loader.credentials_provider(credentials);
        }
        let config = loader.load().await;

        tracing::info!(bucket = %settings.bucket, "S3 uploader initialized");
        Self {
            client: Client::new(&config),
            bucket: settings.bucket.clone(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ArtifactUploader for S3Uploader {
    async fn upload(&self, local_path: &Path, key: &str) -> Result<String, UploadError> {
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| UploadError::Read {
                path: local_path.to_path_buf(),
                message: e.to_string(),
            })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .acl(ObjectCannedAcl::PublicRead)
            .content_type(VIDEO_CONTENT_TYPE)
            .send()
            .await
            .map_err(|e| UploadError::Request {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let url = public_url(&self.bucket, key);
        tracing::info!(bucket = %self.bucket, key, url = %url, "Artifact uploaded");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn no_bucket_disables_upload() {
        assert!(S3Settings::from_vars(lookup(&[("AWS_REGION", "us-east-1")])).is_none());
        assert!(S3Settings::from_vars(lookup(&[("AWS_S3_BUCKET", "  ")])).is_none());
    }

    #[test]
    fn primary_bucket_variable_wins() {
        let settings = S3Settings::from_vars(lookup(&[
            ("AWS_S3_BUCKET", "primary"),
            ("AWS_BUCKET", "secondary"),
        ]))
        .unwrap();
        assert_eq!(settings.bucket, "primary");
    }

    #[test]
    fn legacy_bucket_variable_is_accepted() {
        let settings = S3Settings::from_vars(lookup(&[
            ("AWS_BUCKET", "videos"),
            ("AWS_REGION", "eu-west-1"),
        ]))
        .unwrap();
        assert_eq!(settings.bucket, "videos");
        assert_eq!(settings.region.as_deref(), Some("eu-west-1"));
        assert!(settings.static_credentials().is_none());
    }

    #[test]
    fn static_credentials_need_both_keys() {
        let partial = S3Settings::from_vars(lookup(&[
            ("AWS_S3_BUCKET", "b"),
            ("AWS_ACCESS_KEY_ID", "AKIA"),
        ]))
        .unwrap();
        assert!(partial.static_credentials().is_none());

        let full = S3Settings::from_vars(lookup(&[
            ("AWS_S3_BUCKET", "b"),
            ("AWS_ACCESS_KEY_ID", "AKIA"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
        ]))
        .unwrap();
        let creds = full.static_credentials().unwrap();
        assert_eq!(creds.access_key_id(), "AKIA");
        assert_eq!(creds.secret_access_key(), "secret");
    }

    #[test]
    fn url_format() {
        assert_eq!(
            public_url("videos", "manim_videos/manim-1.mp4"),
            "https://videos.s3.amazonaws.com/manim_videos/manim-1.mp4"
        );
    }

    #[tokio::test]
    async fn upload_of_missing_file_reports_read_error() {
        let settings = S3Settings {
            bucket: "videos".into(),
            region: Some("us-east-1".into()),
            access_key_id: Some("AKIA".into()),
            secret_access_key: Some("secret".into()),
        };
        let uploader = S3Uploader::connect(&settings).await;
        assert_eq!(uploader.bucket(), "videos");

        let result = uploader
            .upload(Path::new("/definitely/not/here.mp4"), "manim_videos/x.mp4")
            .await;
        assert!(matches!(result, Err(UploadError::Read { .. })));
    }
}
