//! Domain model and scene compiler for the Manim render worker.
//!
//! Pure logic only: no filesystem, subprocess, or network access lives
//! here. The store, cloud, and worker crates build on these types.

pub mod error;
pub mod job;
pub mod scene;
pub mod types;
