//! Job descriptor model and lifecycle state machine.
//!
//! A descriptor moves `queued -> processing -> {completed, failed}`. The
//! transition methods on [`JobDescriptor`] are the only place the status
//! changes, and they keep `result_url` / `error` consistent with it.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::types::{JobId, Timestamp};

/// Maximum length of a job identifier.
const MAX_JOB_ID_LEN: usize = 128;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a job descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Wire name as stored in the descriptor file.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// `completed` and `failed` admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Render quality
// ---------------------------------------------------------------------------

/// Renderer quality preset requested by the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderQuality {
    #[default]
    Low,
    Medium,
    High,
    Production,
}

impl RenderQuality {
    /// Lenient parse; unknown or missing values render at low quality.
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(|n| n.trim().to_ascii_lowercase()).as_deref() {
            Some("medium") => Self::Medium,
            Some("high") => Self::High,
            Some("production") => Self::Production,
            _ => Self::Low,
        }
    }

    /// Manim CLI quality flag.
    pub fn cli_flag(self) -> &'static str {
        match self {
            Self::Low => "-ql",
            Self::Medium => "-qm",
            Self::High => "-qh",
            Self::Production => "-qk",
        }
    }
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// Persistent unit of work, one JSON document per job.
///
/// `prompt`, `quality` and `scene_params` are kept as raw JSON: they are
/// untrusted, and a mistyped value must not make the record unreadable
/// (an unreadable queued record would never be picked). Keys this worker
/// does not know about (for example `createdAt`) are carried through
/// `extra` so write-backs never drop submitter data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescriptor {
    pub job_id: JobId,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<Timestamp>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobDescriptor {
    /// New queued descriptor with no payload.
    pub fn queued(job_id: impl Into<JobId>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Queued,
            prompt: None,
            quality: None,
            scene_params: None,
            result_url: None,
            error: None,
            processed_at: None,
            extra: Map::new(),
        }
    }

    /// Prompt text, if the submitter sent a string.
    pub fn prompt_text(&self) -> Option<&str> {
        self.prompt.as_ref().and_then(Value::as_str)
    }

    /// Requested render quality. Non-string values render at the default.
    pub fn render_quality(&self) -> RenderQuality {
        RenderQuality::from_name(self.quality.as_ref().and_then(Value::as_str))
    }

    /// `queued -> processing`. Establishes ownership for the current worker.
    pub fn claim(&mut self) -> Result<(), CoreError> {
        self.transition(JobStatus::Queued, JobStatus::Processing)?;
        self.result_url = None;
        self.error = None;
        Ok(())
    }

    /// `processing -> completed` with the artifact location.
    pub fn complete(&mut self, result_url: impl Into<String>) -> Result<(), CoreError> {
        self.transition(JobStatus::Processing, JobStatus::Completed)?;
        self.result_url = Some(result_url.into());
        self.error = None;
        Ok(())
    }

    /// `processing -> failed` with a human-readable diagnostic.
    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), CoreError> {
        self.transition(JobStatus::Processing, JobStatus::Failed)?;
        self.error = Some(error.into());
        self.result_url = None;
        Ok(())
    }

    /// Stamp the terminal transition time.
    pub fn mark_processed(&mut self, at: Timestamp) {
        self.processed_at = Some(at);
    }

    /// True when the status and result fields agree with each other.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            JobStatus::Queued | JobStatus::Processing => {
                self.result_url.is_none() && self.error.is_none()
            }
            JobStatus::Completed => self.result_url.is_some() && self.error.is_none(),
            JobStatus::Failed => self.error.is_some() && self.result_url.is_none(),
        }
    }

    fn transition(&mut self, expected: JobStatus, to: JobStatus) -> Result<(), CoreError> {
        if self.status != expected {
            return Err(CoreError::InvalidTransition {
                job_id: self.job_id.clone(),
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a job identifier before it is used to build a file name.
///
/// Allowed characters: ASCII alphanumeric, hyphen, underscore, dot. A
/// leading dot is rejected so `.` / `..` can never name a path segment.
pub fn validate_job_id(job_id: &str) -> Result<(), CoreError> {
    if job_id.is_empty() {
        return Err(CoreError::Validation("Job id must not be empty".to_string()));
    }
    if job_id.len() > MAX_JOB_ID_LEN {
        return Err(CoreError::Validation(format!(
            "Job id must not exceed {MAX_JOB_ID_LEN} characters"
        )));
    }
    if job_id.starts_with('.')
        || !job_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(CoreError::Validation(format!(
            "Job id '{job_id}' may only contain alphanumeric, hyphen, underscore, or dot characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
