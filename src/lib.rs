// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod resolve;
pub mod types;

use std::fs;
use std::io::{self, Write};

use anyhow::Context;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_optional};
use crate::errors::{CoderunError, Result};
use crate::exec::{ExecutionResult, Runner, RunnerOptions, StepOutcome, StreamKind, SystemSpawner};
use crate::resolve::{CommandPlan, Resolver};
use crate::types::StepPolicy;

pub use crate::resolve::resolve;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - resolving the file into a command plan
/// - the process runner
/// - printing captured output
///
/// Returns the exit code the process should end with.
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_optional(args.config.as_deref())?;
    let resolver = Resolver::with_configured(&cfg.language);

    if args.list {
        print_languages(&resolver);
        return Ok(0);
    }

    let file = args
        .file
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("no source file given"))?;
    let plan = resolver.resolve(file)?;

    if args.dry_run {
        print_dry_run(&plan);
        return Ok(0);
    }

    let options = runner_options(&cfg, &args)?;
    let spawner = SystemSpawner::new(args.shell || cfg.config.shell);
    let runner = Runner::new(spawner, options);

    match runner.run(&plan).await {
        Ok(result) => {
            write_result(&mut io::stdout().lock(), &mut io::stderr().lock(), &result, args.raw)?;
            let code = exit_status(&result);
            info!(exit_code = code, "run finished");
            Ok(code)
        }
        Err(failure) => {
            if let Some(completed) = failure.completed() {
                write_result(&mut io::stdout().lock(), &mut io::stderr().lock(), completed, args.raw)?;
            }
            Err(CoderunError::Run(failure))
        }
    }
}

/// Merge `[config]` with CLI overrides. CLI flags win.
pub fn runner_options(cfg: &ConfigFile, args: &CliArgs) -> Result<RunnerOptions> {
    let input = match &args.input {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("reading stdin input from {:?}", path))?,
        ),
        None => None,
    };

    let max_output_bytes = match args.max_output_bytes {
        Some(0) => None,
        Some(n) => Some(n),
        None => cfg.max_output_bytes(),
    };

    let on_step_failure = if args.keep_going {
        StepPolicy::Continue
    } else {
        cfg.config.on_step_failure
    };

    Ok(RunnerOptions {
        timeout: args.timeout.or(cfg.timeout()),
        max_output_bytes,
        on_step_failure,
        input,
    })
}

/// Last step's exit code; `1` if it had none (signal, timeout).
pub fn exit_status(result: &ExecutionResult) -> i32 {
    result.exit_code().unwrap_or(1)
}

/// Render captured output and step outcomes.
///
/// In `raw` mode stdout lines go to `out` and stderr lines to `err`, with no
/// prefixes or summary lines. Otherwise everything goes to `out`.
pub fn write_result<O: Write, E: Write>(
    out: &mut O,
    err: &mut E,
    result: &ExecutionResult,
    raw: bool,
) -> io::Result<()> {
    for (index, report) in result.steps.iter().enumerate() {
        for line in result.step_output(index) {
            match (raw, line.stream) {
                (true, StreamKind::Stdout) => writeln!(out, "{}", line.text)?,
                (true, StreamKind::Stderr) => writeln!(err, "{}", line.text)?,
                (false, stream) => writeln!(out, "{}: {}", stream.prefix(), line.text)?,
            }
        }
        if !raw {
            match report.outcome {
                StepOutcome::Exited(code) => writeln!(out, "exit: {code}")?,
                StepOutcome::Signalled => writeln!(out, "exit: terminated by signal")?,
                StepOutcome::TimedOut => writeln!(out, "exit: timed out")?,
                StepOutcome::OutputLimit => writeln!(out, "exit: output limit reached")?,
            }
        }
    }

    if !raw {
        if result.truncated {
            writeln!(out, "... output truncated")?;
        }
        for step in result.skipped.iter() {
            writeln!(out, "skipped: {}", step.command)?;
        }
    }
    out.flush()?;
    err.flush()
}

/// Simple dry-run output: print the language and each command.
fn print_dry_run(plan: &CommandPlan) {
    println!("coderun dry-run");
    println!("  file: {}", plan.file_name());
    println!("  language: {}", plan.language());
    println!();

    println!("steps ({}):", plan.len());
    for step in plan.steps() {
        println!("  - {}: {}", step.role, step.command);
    }

    debug!("dry-run complete (no execution)");
}

fn print_languages(resolver: &Resolver) {
    println!("supported languages ({}):", resolver.languages().len());
    for lang in resolver.languages() {
        println!("  - {} ({})", lang.id, lang.extensions.join(", "));
        if let Some(ref compile) = lang.compile {
            println!("      compile: {compile}");
        }
        println!("      run: {}", lang.run);
    }
}
