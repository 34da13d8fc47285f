//! Poll loop.
//!
//! Scans the store for a queued job, runs it to completion, and repeats.
//! Sleeps for the poll interval only when nothing was queued. Jobs are
//! processed strictly one at a time.

use std::time::Duration;

use manim_store::DescriptorStore;
use tokio_util::sync::CancellationToken;

use crate::error::WorkerError;
use crate::executor::{JobExecutor, JobOutcome};
use crate::renderer::Renderer;

/// Result of a single [`tick`].
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No queued job was found.
    Idle,
    /// One job was picked and driven to a terminal state.
    Processed(JobOutcome),
}

/// One pick + execute pass.
pub async fn tick<S, R>(executor: &JobExecutor<S, R>) -> Result<TickOutcome, WorkerError>
where
    S: DescriptorStore,
    R: Renderer,
{
    let Some(stored) = executor.store().pick_one().await? else {
        return Ok(TickOutcome::Idle);
    };
    tracing::info!(job_id = %stored.job.job_id, location = ?stored.location, "Processing job");
    let outcome = executor.execute(&stored.location, stored.job).await?;
    Ok(TickOutcome::Processed(outcome))
}

/// Run the poll loop until `cancel` is triggered.
///
/// Cancellation is observed between jobs and during the idle sleep; a job
/// in flight always finishes first. Store errors end the loop.
pub async fn run<S, R>(
    executor: &JobExecutor<S, R>,
    poll_interval: Duration,
    cancel: CancellationToken,
) -> Result<(), WorkerError>
where
    S: DescriptorStore,
    R: Renderer,
{
    tracing::info!(
        poll_interval_ms = poll_interval.as_millis() as u64,
        "Worker polling started",
    );

    loop {
        if cancel.is_cancelled() {
            break;
        }

        match tick(executor).await? {
            TickOutcome::Processed(_) => continue,
            TickOutcome::Idle => {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(poll_interval) => {}
                }
            }
        }
    }

    tracing::info!("Worker stopped");
    Ok(())
}
