// src/exec/mod.rs

//! Process execution layer.
//!
//! This module runs the steps of a [`CommandPlan`](crate::resolve::CommandPlan)
//! using `tokio::process::Command` and collects what they print.
//!
//! - [`spawner`] provides the `ProcessSpawner` trait and the concrete
//!   `SystemSpawner` used in production, which tests can replace with a
//!   fake implementation.
//! - [`runner`] owns the sequential step loop, timeouts and step policy.
//! - [`output`] has the line reader and the ordered output sink.
//! - [`result`] defines what a run returns.

pub mod output;
pub mod result;
pub mod runner;
pub mod spawner;

pub use output::{OutputLine, StreamKind};
pub use result::{ExecutionResult, StepOutcome, StepReport};
pub use runner::{DEFAULT_MAX_OUTPUT_BYTES, Runner, RunnerOptions};
pub use spawner::{ProcessHandle, ProcessSpawner, SpawnedProcess, SystemSpawner};
