// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::types::parse_duration;

/// Command-line arguments for `coderun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "coderun",
    version,
    about = "Compile and run a source file based on its extension.",
    long_about = None
)]
pub struct CliArgs {
    /// Source file to build and run, e.g. `hello.c`.
    #[arg(value_name = "FILE", required_unless_present = "list")]
    pub file: Option<String>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Coderun.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CODERUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Kill a step that runs longer than this (e.g. `10s`, `500ms`).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Stop capturing output after this many bytes (0 = unlimited).
    #[arg(long, value_name = "N")]
    pub max_output_bytes: Option<usize>,

    /// Run later steps even if an earlier one failed.
    #[arg(long)]
    pub keep_going: bool,

    /// Run each command through the platform shell.
    #[arg(long)]
    pub shell: bool,

    /// File whose contents are fed to the program's stdin.
    #[arg(long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Print the resolved commands without executing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// List supported languages and exit.
    #[arg(long)]
    pub list: bool,

    /// Print program output unprefixed (stderr lines go to stderr).
    #[arg(long)]
    pub raw: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
