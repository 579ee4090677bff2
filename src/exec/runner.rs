// src/exec/runner.rs

//! Sequential plan runner.

use std::io;
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use crate::errors::{RunError, RunFailure};
use crate::exec::output::{LineReader, OutputSink, StreamKind};
use crate::exec::result::{ExecutionResult, StepOutcome, StepReport};
use crate::exec::spawner::{BoxedReader, BoxedWriter, ProcessSpawner, SpawnedProcess, SystemSpawner};
use crate::resolve::{CommandPlan, PlanStep, StepRole};
use crate::types::StepPolicy;

/// Output cap applied when nothing else is configured.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 50_000;

/// Knobs for a [`Runner`].
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Per-step limit; the child is killed when it elapses.
    pub timeout: Option<Duration>,
    /// Cap on captured output bytes across the whole run. The step that
    /// reaches it is killed.
    pub max_output_bytes: Option<usize>,
    pub on_step_failure: StepPolicy,
    /// Written to the stdin of `run` steps. Compile steps never see it.
    pub input: Option<String>,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            max_output_bytes: Some(DEFAULT_MAX_OUTPUT_BYTES),
            on_step_failure: StepPolicy::default(),
            input: None,
        }
    }
}

/// How the process work of a step ended, short of a timeout.
enum StepEnd {
    Exited(Option<i32>),
    Capped,
}

/// Executes a [`CommandPlan`] one step at a time.
///
/// A step starts only after the previous process has exited and been
/// released. Within a step stdout and stderr are drained concurrently, so
/// lines land in the result in the order they arrive.
pub struct Runner<S = SystemSpawner> {
    spawner: S,
    options: RunnerOptions,
}

impl<S: ProcessSpawner> Runner<S> {
    pub fn new(spawner: S, options: RunnerOptions) -> Self {
        Self { spawner, options }
    }

    /// Run every step of `plan` (subject to the step policy).
    ///
    /// Non-zero exits and timeouts are recorded in the returned result. Spawn
    /// and stream errors end the run with a [`RunFailure`].
    pub async fn run(&self, plan: &CommandPlan) -> Result<ExecutionResult, RunFailure> {
        info!(
            language = plan.language(),
            file = plan.file_name(),
            steps = plan.len(),
            "running command plan"
        );

        let mut sink = OutputSink::new(self.options.max_output_bytes);
        let mut reports: Vec<StepReport> = Vec::with_capacity(plan.len());
        let mut remaining = plan.steps().iter().enumerate();

        while let Some((index, step)) = remaining.next() {
            match self.run_step(index, step, &mut sink).await {
                Ok(report) => {
                    let failed = !report.outcome.success();
                    reports.push(report);

                    if failed && self.options.on_step_failure == StepPolicy::Stop {
                        let skipped: Vec<PlanStep> = remaining.map(|(_, s)| s.clone()).collect();
                        if !skipped.is_empty() {
                            warn!(
                                command = %step.command,
                                skipped = skipped.len(),
                                "step failed; skipping remaining steps"
                            );
                        }
                        return Ok(finish(sink, reports, skipped));
                    }
                }
                Err(err) => {
                    error!(command = err.command(), error = %err, "step could not be run");
                    if reports.is_empty() {
                        return Err(RunFailure::Total(err));
                    }
                    return Err(RunFailure::Partial {
                        completed: finish(sink, reports, Vec::new()),
                        error: err,
                    });
                }
            }
        }

        Ok(finish(sink, reports, Vec::new()))
    }

    async fn run_step(
        &self,
        index: usize,
        step: &PlanStep,
        sink: &mut OutputSink,
    ) -> Result<StepReport, RunError> {
        let started = Instant::now();
        let input = match step.role {
            StepRole::Run => self.options.input.as_deref(),
            StepRole::Compile => None,
        };

        info!(step = %step.role, command = %step.command, "starting step process");

        let SpawnedProcess {
            stdout,
            stderr,
            stdin,
            mut handle,
        } = self
            .spawner
            .spawn(&step.command, input.is_some())
            .map_err(|source| RunError::Spawn {
                command: step.command.clone(),
                source,
            })?;

        // Feed stdin while draining, so a child that writes before reading
        // cannot block on a full pipe. Once both output streams are done the
        // feeder is dropped, which closes stdin.
        let work = async {
            let feeding = write_input(stdin, input);
            let draining = drain(index, stdout, stderr, sink);
            tokio::pin!(feeding, draining);

            let mut fed = false;
            let capped = loop {
                tokio::select! {
                    written = &mut feeding, if !fed => {
                        written?;
                        fed = true;
                    }
                    drained = &mut draining => break drained?,
                }
            };

            if capped {
                return Ok(StepEnd::Capped);
            }
            let code = handle.wait().await?;
            Ok::<_, io::Error>(StepEnd::Exited(code))
        };

        let finished = match self.options.timeout {
            Some(limit) => tokio::time::timeout(limit, work).await.ok(),
            None => Some(work.await),
        };

        let outcome = match finished {
            Some(Ok(StepEnd::Exited(Some(code)))) => StepOutcome::Exited(code),
            Some(Ok(StepEnd::Exited(None))) => StepOutcome::Signalled,
            Some(Ok(StepEnd::Capped)) => {
                warn!(
                    command = %step.command,
                    max_output_bytes = ?self.options.max_output_bytes,
                    "output cap reached; killing process"
                );
                if let Err(e) = handle.kill().await {
                    warn!(command = %step.command, error = %e, "failed to kill capped process");
                }
                StepOutcome::OutputLimit
            }
            Some(Err(source)) => {
                // `handle` is dropped on return, which kills the child.
                return Err(RunError::Io {
                    command: step.command.clone(),
                    source,
                });
            }
            None => {
                warn!(
                    command = %step.command,
                    timeout = ?self.options.timeout,
                    "step timed out; killing process"
                );
                if let Err(e) = handle.kill().await {
                    warn!(command = %step.command, error = %e, "failed to kill timed-out process");
                }
                StepOutcome::TimedOut
            }
        };

        let elapsed = started.elapsed();
        info!(
            step = %step.role,
            command = %step.command,
            exit_code = ?outcome.exit_code(),
            success = outcome.success(),
            elapsed_ms = elapsed.as_millis() as u64,
            "step process exited"
        );

        Ok(StepReport {
            role: step.role,
            command: step.command.clone(),
            outcome,
            elapsed,
        })
    }
}

fn finish(sink: OutputSink, steps: Vec<StepReport>, skipped: Vec<PlanStep>) -> ExecutionResult {
    let (output, truncated) = sink.into_parts();
    if truncated {
        warn!("captured output exceeded the byte cap and was truncated");
    }
    ExecutionResult {
        output,
        steps,
        skipped,
        truncated,
    }
}

/// Read both streams into `sink` until they close. Returns `true` when the
/// output cap stopped the drain early.
async fn drain(
    step: usize,
    stdout: BoxedReader,
    stderr: BoxedReader,
    sink: &mut OutputSink,
) -> io::Result<bool> {
    let mut out = LineReader::new(stdout);
    let mut err = LineReader::new(stderr);
    let mut out_open = true;
    let mut err_open = true;

    while out_open || err_open {
        let budget = sink.line_budget();
        // `biased` keeps the order deterministic when both streams are ready.
        let accepted = tokio::select! {
            biased;
            line = out.next_line(budget), if out_open => match line? {
                Some(text) => sink.push(step, StreamKind::Stdout, text),
                None => {
                    out_open = false;
                    true
                }
            },
            line = err.next_line(budget), if err_open => match line? {
                Some(text) => sink.push(step, StreamKind::Stderr, text),
                None => {
                    err_open = false;
                    true
                }
            },
        };
        if !accepted {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Write `input` and close stdin. A child that exits without reading its
/// input is not an error.
async fn write_input(stdin: Option<BoxedWriter>, input: Option<&str>) -> io::Result<()> {
    let (Some(mut stdin), Some(input)) = (stdin, input) else {
        return Ok(());
    };

    let written = async {
        stdin.write_all(input.as_bytes()).await?;
        stdin.shutdown().await?;
        Ok::<_, io::Error>(())
    };

    match written.await {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!("child closed stdin before all input was written");
            Ok(())
        }
        other => other,
    }
}
