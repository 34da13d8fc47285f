//! Background worker that turns queued job descriptors into rendered videos.
//!
//! The binary wires these pieces together:
//! [`config::WorkerConfig`] → [`executor::JobExecutor`] (store, renderer,
//! optional uploader) → [`poll::run`].

pub mod config;
pub mod error;
pub mod executor;
pub mod poll;
pub mod renderer;
