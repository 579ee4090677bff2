// src/resolve/plan.rs

use std::fmt;

/// Whether a step builds the program or runs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepRole {
    Compile,
    Run,
}

impl fmt::Display for StepRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepRole::Compile => f.write_str("compile"),
            StepRole::Run => f.write_str("run"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub role: StepRole,
    pub command: String,
}

/// Ordered commands needed to build and run one file.
///
/// Steps execute in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlan {
    language: String,
    file_name: String,
    steps: Vec<PlanStep>,
}

impl CommandPlan {
    pub fn new(language: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            file_name: file_name.into(),
            steps: Vec::new(),
        }
    }

    pub fn with_step(mut self, role: StepRole, command: impl Into<String>) -> Self {
        self.steps.push(PlanStep {
            role,
            command: command.into(),
        });
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Command strings in execution order.
    pub fn commands(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.command.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
