//! Directory-backed descriptor store.
//!
//! Layout: `<dir>/<prefix>-<suffix>.json`, one pretty-printed JSON document
//! per job. Writes go to a dot-prefixed temp file first and are renamed
//! into place, so a scan never observes a half-written descriptor.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use manim_core::error::CoreError;
use manim_core::job::{validate_job_id, JobDescriptor, JobStatus};

use crate::error::StoreError;
use crate::{DescriptorStore, StoredJob};

/// Default descriptor file prefix.
pub const DEFAULT_PREFIX: &str = "manim";

/// Descriptor file extension.
const EXTENSION: &str = ".json";

/// One JSON file per job in a single directory.
#[derive(Debug, Clone)]
pub struct FsDescriptorStore {
    dir: PathBuf,
    prefix: String,
}

impl FsDescriptorStore {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the store directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::io(&self.dir, e))
    }

    /// File path for `job_id`.
    ///
    /// Ids that already carry the prefix (`manim-123`) map to
    /// `manim-123.json`; bare ids (`123`) map to `manim-123.json` as well.
    pub fn path_for(&self, job_id: &str) -> Result<PathBuf, StoreError> {
        validate_job_id(job_id)?;
        let stem_prefix = format!("{}-", self.prefix);
        let file_name = if job_id.starts_with(&stem_prefix) {
            format!("{job_id}{EXTENSION}")
        } else {
            format!("{stem_prefix}{job_id}{EXTENSION}")
        };
        Ok(self.dir.join(file_name))
    }

    fn is_descriptor_name(&self, name: &str) -> bool {
        name.len() > self.prefix.len() + 1 + EXTENSION.len()
            && name.starts_with(&self.prefix)
            && name[self.prefix.len()..].starts_with('-')
            && name.ends_with(EXTENSION)
    }

    /// Paths of all descriptor files, in directory enumeration order.
    ///
    /// Failing to open the directory is an error; a bad individual entry
    /// is logged and skipped.
    async fn descriptor_paths(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| StoreError::io(&self.dir, e))?;

        let mut paths = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(dir = %self.dir.display(), error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !self.is_descriptor_name(name) {
                continue;
            }
            match entry.file_type().await {
                Ok(ft) if ft.is_file() => paths.push(entry.path()),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(path = %entry.path().display(), error = %e, "Skipping descriptor with unreadable metadata");
                }
            }
        }
        Ok(paths)
    }

    async fn read_descriptor(path: &Path) -> Result<JobDescriptor, StoreError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| StoreError::io(path, e))?;
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a scanned descriptor, logging and discarding failures.
    async fn read_for_scan(path: &Path) -> Option<JobDescriptor> {
        match Self::read_descriptor(path).await {
            Ok(job) => Some(job),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping job descriptor");
                None
            }
        }
    }
}

impl DescriptorStore for FsDescriptorStore {
    type Location = PathBuf;

    async fn list_by_status(
        &self,
        status: JobStatus,
    ) -> Result<Vec<StoredJob<PathBuf>>, StoreError> {
        let mut jobs = Vec::new();
        for path in self.descriptor_paths().await? {
            if let Some(job) = Self::read_for_scan(&path).await {
                if job.status == status {
                    jobs.push(StoredJob {
                        location: path,
                        job,
                    });
                }
            }
        }
        Ok(jobs)
    }

    async fn pick_one(&self) -> Result<Option<StoredJob<PathBuf>>, StoreError> {
        for path in self.descriptor_paths().await? {
            if let Some(job) = Self::read_for_scan(&path).await {
                if job.status == JobStatus::Queued {
                    return Ok(Some(StoredJob {
                        location: path,
                        job,
                    }));
                }
            }
        }
        Ok(None)
    }

    async fn get(&self, job_id: &str) -> Result<Option<StoredJob<PathBuf>>, StoreError> {
        let path = self.path_for(job_id)?;
        match Self::read_descriptor(&path).await {
            Ok(job) => Ok(Some(StoredJob {
                location: path,
                job,
            })),
            Err(StoreError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn write(&self, location: &PathBuf, job: &JobDescriptor) -> Result<(), StoreError> {
        if !job.is_consistent() {
            return Err(CoreError::Validation(format!(
                "Job {} has result fields that disagree with status {}",
                job.job_id, job.status
            ))
            .into());
        }

        let mut body =
            serde_json::to_string_pretty(job).map_err(|source| StoreError::Serialize {
                job_id: job.job_id.clone(),
                source,
            })?;
        body.push('\n');

        let file_name = location
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| job.job_id.clone());
        let tmp = location.with_file_name(format!(".{file_name}.tmp"));

        tokio::fs::write(&tmp, body.as_bytes())
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, location)
            .await
            .map_err(|e| StoreError::io(location, e))?;

        tracing::debug!(job_id = %job.job_id, status = %job.status, path = %location.display(), "Job descriptor written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_for_prefixed_and_bare_ids() {
        let store = FsDescriptorStore::new("/jobs", DEFAULT_PREFIX);
        assert_eq!(
            store.path_for("manim-1700").unwrap(),
            PathBuf::from("/jobs/manim-1700.json")
        );
        assert_eq!(
            store.path_for("1700").unwrap(),
            PathBuf::from("/jobs/manim-1700.json")
        );
    }

    #[test]
    fn path_for_rejects_traversal() {
        let store = FsDescriptorStore::new("/jobs", DEFAULT_PREFIX);
        assert!(matches!(
            store.path_for("../../etc/passwd"),
            Err(StoreError::Core(_))
        ));
    }

    #[test]
    fn descriptor_name_matching() {
        let store = FsDescriptorStore::new("/jobs", DEFAULT_PREFIX);
        assert!(store.is_descriptor_name("manim-1.json"));
        assert!(!store.is_descriptor_name("manim-.json"));
        assert!(!store.is_descriptor_name("manimx-1.json"));
        assert!(!store.is_descriptor_name("other-1.json"));
        assert!(!store.is_descriptor_name("manim-1.json.tmp"));
        assert!(!store.is_descriptor_name(".manim-1.json.tmp"));
        assert!(!store.is_descriptor_name("manim-1.txt"));
    }
}
