//! Job descriptor persistence.
//!
//! [`DescriptorStore`] is the seam between the executor and wherever job
//! descriptors live. [`FsDescriptorStore`] keeps one JSON file per job in a
//! directory, which is what the submission side writes today.

pub mod error;
pub mod fs;

use std::fmt;
use std::future::Future;

use manim_core::job::{JobDescriptor, JobStatus};

pub use error::StoreError;
pub use fs::FsDescriptorStore;

/// A descriptor together with the location it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredJob<L> {
    pub location: L,
    pub job: JobDescriptor,
}

/// Enumerate / get / put access to job descriptors.
///
/// Enumeration order is whatever the backing store yields. Callers must
/// not rely on FIFO delivery.
pub trait DescriptorStore: Send + Sync {
    /// Where a descriptor lives (a file path for the directory store).
    type Location: Clone + fmt::Debug + Send + Sync;

    /// All readable descriptors with the given status. Unreadable or
    /// malformed records are skipped, not reported as errors.
    fn list_by_status(
        &self,
        status: JobStatus,
    ) -> impl Future<Output = Result<Vec<StoredJob<Self::Location>>, StoreError>> + Send;

    /// All queued descriptors.
    fn list_queued(
        &self,
    ) -> impl Future<Output = Result<Vec<StoredJob<Self::Location>>, StoreError>> + Send {
        self.list_by_status(JobStatus::Queued)
    }

    /// The first queued descriptor found, if any.
    fn pick_one(
        &self,
    ) -> impl Future<Output = Result<Option<StoredJob<Self::Location>>, StoreError>> + Send {
        async move { Ok(self.list_queued().await?.into_iter().next()) }
    }

    /// Read one descriptor by job id. `Ok(None)` when it does not exist.
    fn get(
        &self,
        job_id: &str,
    ) -> impl Future<Output = Result<Option<StoredJob<Self::Location>>, StoreError>> + Send;

    /// Replace the descriptor at `location` with `job`.
    fn write(
        &self,
        location: &Self::Location,
        job: &JobDescriptor,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
