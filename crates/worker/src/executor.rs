//! Single-job pipeline: claim, compile, render, upload, finalize.
//!
//! Every failure after the claim is converted into a `failed` descriptor
//! so a claimed job always reaches a terminal state. Only store writes can
//! make [`JobExecutor::execute`] return an error.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use manim_cloud::{video_object_key, ArtifactUploader};
use manim_core::job::{validate_job_id, JobDescriptor, JobStatus};
use manim_core::scene::{compile_params, SCENE_CLASS};
use manim_store::DescriptorStore;

use crate::config::WorkerConfig;
use crate::error::{JobError, WorkerError};
use crate::renderer::{RenderRequest, Renderer};

/// File name of the generated script inside a job's working directory.
pub const SCRIPT_FILE: &str = "scene.py";

/// Filesystem layout used while executing jobs.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    /// Root under which `<jobId>/` working directories are created.
    pub work_dir: PathBuf,
    /// Directory rendered videos are written to.
    pub output_dir: PathBuf,
    /// URL path under which `output_dir` is served.
    pub public_prefix: String,
}

impl OutputLayout {
    pub fn from_config(config: &WorkerConfig) -> Self {
        Self {
            work_dir: config.work_dir.clone(),
            output_dir: config.output_dir.clone(),
            public_prefix: config.public_prefix.clone(),
        }
    }

    fn video_file_name(job_id: &str) -> String {
        format!("{job_id}.mp4")
    }

    pub fn job_work_dir(&self, job_id: &str) -> PathBuf {
        self.work_dir.join(job_id)
    }

    pub fn video_path(&self, job_id: &str) -> PathBuf {
        self.output_dir.join(Self::video_file_name(job_id))
    }

    /// Local URL for a rendered video when no uploader is configured.
    pub fn public_url(&self, job_id: &str) -> String {
        format!("{}/{}", self.public_prefix, Self::video_file_name(job_id))
    }
}

/// Final state of one executed job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobOutcome {
    pub job_id: String,
    pub status: JobStatus,
    pub result_url: Option<String>,
    pub error: Option<String>,
}

impl From<&JobDescriptor> for JobOutcome {
    fn from(job: &JobDescriptor) -> Self {
        Self {
            job_id: job.job_id.clone(),
            status: job.status,
            result_url: job.result_url.clone(),
            error: job.error.clone(),
        }
    }
}

/// Runs claimed jobs end to end against a store and a renderer.
pub struct JobExecutor<S, R> {
    store: S,
    renderer: R,
    uploader: Option<Arc<dyn ArtifactUploader>>,
    layout: OutputLayout,
}

impl<S: DescriptorStore, R: Renderer> JobExecutor<S, R> {
    pub fn new(store: S, renderer: R, layout: OutputLayout) -> Self {
        Self {
            store,
            renderer,
            uploader: None,
            layout,
        }
    }

    /// Upload finished videos instead of serving them from the output dir.
    pub fn with_uploader(mut self, uploader: Arc<dyn ArtifactUploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Process one queued descriptor stored at `location`.
    ///
    /// The descriptor is persisted as `processing` before any work starts
    /// and once more in its terminal state with `processedAt` stamped.
    pub async fn execute(
        &self,
        location: &S::Location,
        mut job: JobDescriptor,
    ) -> Result<JobOutcome, WorkerError> {
        job.claim()?;
        self.store.write(location, &job).await?;
        tracing::info!(job_id = %job.job_id, "Job claimed");

        match self.process(&job).await {
            Ok(result_url) => job.complete(result_url)?,
            Err(e) => {
                tracing::warn!(job_id = %job.job_id, error = %e, "Job failed");
                job.fail(e.to_string())?;
            }
        }
        job.mark_processed(Utc::now());
        self.store.write(location, &job).await?;

        let outcome = JobOutcome::from(&job);
        tracing::info!(
            job_id = %outcome.job_id,
            status = %outcome.status,
            result_url = outcome.result_url.as_deref().unwrap_or(""),
            "Job finished",
        );
        Ok(outcome)
    }

    /// The guarded region. Returns the result URL.
    async fn process(&self, job: &JobDescriptor) -> Result<String, JobError> {
        validate_job_id(&job.job_id)?;

        let compiled = compile_params(job.prompt_text(), job.scene_params.as_ref());
        tracing::debug!(job_id = %job.job_id, scene = compiled.kind, title = %compiled.title, "Scene compiled");

        let working_dir = self.layout.job_work_dir(&job.job_id);
        recreate_dir(&working_dir).await?;
        let script_path = working_dir.join(SCRIPT_FILE);
        tokio::fs::write(&script_path, compiled.script.as_bytes())
            .await
            .map_err(|e| JobError::workspace(&script_path, e))?;

        tokio::fs::create_dir_all(&self.layout.output_dir)
            .await
            .map_err(|e| JobError::workspace(&self.layout.output_dir, e))?;
        let output_path = self.layout.video_path(&job.job_id);

        let request = RenderRequest {
            script_path,
            scene_class: SCENE_CLASS,
            quality: job.render_quality(),
            output_path,
            working_dir,
        };
        self.renderer.render(&request).await?;

        match &self.uploader {
            Some(uploader) => {
                let key = video_object_key(&job.job_id);
                Ok(uploader.upload(&request.output_path, &key).await?)
            }
            None => Ok(self.layout.public_url(&job.job_id)),
        }
    }
}

/// Remove `dir` if present and create it empty.
async fn recreate_dir(dir: &Path) -> Result<(), JobError> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(JobError::workspace(dir, e)),
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| JobError::workspace(dir, e))
}
