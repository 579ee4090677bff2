// src/exec/result.rs

use std::time::Duration;

use crate::exec::output::{OutputLine, StreamKind};
use crate::resolve::{PlanStep, StepRole};

/// How a step's process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Exited on its own; `0` is success.
    Exited(i32),
    /// Terminated without an exit code (signal).
    Signalled,
    /// Killed after exceeding the configured timeout.
    TimedOut,
    /// Killed once the output cap was reached.
    OutputLimit,
}

impl StepOutcome {
    pub fn success(&self) -> bool {
        matches!(self, StepOutcome::Exited(0))
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            StepOutcome::Exited(code) => Some(*code),
            StepOutcome::Signalled | StepOutcome::TimedOut | StepOutcome::OutputLimit => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub role: StepRole,
    pub command: String,
    pub outcome: StepOutcome,
    pub elapsed: Duration,
}

/// Everything captured while running a plan.
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    /// Lines in the order they were read, across all steps.
    pub output: Vec<OutputLine>,
    /// One report per step that ran, in order.
    pub steps: Vec<StepReport>,
    /// Steps not started because an earlier step failed.
    pub skipped: Vec<PlanStep>,
    /// Some output was dropped because of the byte cap. The step that hit
    /// the cap ends with [`StepOutcome::OutputLimit`].
    pub truncated: bool,
}

impl ExecutionResult {
    /// Exit code of the last step that ran.
    pub fn exit_code(&self) -> Option<i32> {
        self.steps.last().and_then(|s| s.outcome.exit_code())
    }

    /// Every step ran and exited with 0.
    pub fn success(&self) -> bool {
        self.skipped.is_empty() && self.steps.iter().all(|s| s.outcome.success())
    }

    pub fn lines(&self, stream: StreamKind) -> impl Iterator<Item = &str> {
        self.output
            .iter()
            .filter(move |l| l.stream == stream)
            .map(|l| l.text.as_str())
    }

    /// Output of one step, in order.
    pub fn step_output(&self, step: usize) -> impl Iterator<Item = &OutputLine> {
        self.output.iter().filter(move |l| l.step == step)
    }
}
