use std::process::ExitCode;
use std::sync::Arc;

use manim_cloud::S3Uploader;
use manim_core::job::JobStatus;
use manim_store::{DescriptorStore, FsDescriptorStore};
use manim_worker::config::WorkerConfig;
use manim_worker::error::WorkerError;
use manim_worker::executor::{JobExecutor, OutputLayout};
use manim_worker::poll;
use manim_worker::renderer::ConfiguredRenderer;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "manim_worker=info,manim_store=info,manim_cloud=info";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Worker exited with error");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` filtering, human-readable output unless `LOG_FORMAT=json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

async fn run() -> Result<(), WorkerError> {
    let config = WorkerConfig::from_env()?;

    let store = FsDescriptorStore::new(&config.job_dir, config.job_prefix.clone());
    store.ensure_dir().await?;
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .map_err(|source| WorkerError::Setup {
            path: config.output_dir.clone(),
            source,
        })?;

    for stuck in store.list_by_status(JobStatus::Processing).await? {
        tracing::warn!(
            job_id = %stuck.job.job_id,
            path = %stuck.location.display(),
            "Job left in processing by a previous run; it will not be retried",
        );
    }

    let renderer = ConfiguredRenderer::from_config(&config);
    let renderer_name = renderer.name();
    let mut executor = JobExecutor::new(store, renderer, OutputLayout::from_config(&config));

    if let Some(settings) = &config.s3 {
        let uploader = S3Uploader::connect(settings).await;
        tracing::info!(bucket = uploader.bucket(), "Rendered videos will be uploaded to S3");
        executor = executor.with_uploader(Arc::new(uploader));
    }

    tracing::info!(
        job_dir = %executor.store().dir().display(),
        output_dir = %config.output_dir.display(),
        renderer = renderer_name,
        upload = config.s3.is_some(),
        "Manim worker starting",
    );

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received, finishing current job");
            shutdown.cancel();
        }
    });

    poll::run(&executor, config.poll_interval, cancel).await
}
