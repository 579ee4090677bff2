#![cfg(unix)]

mod common;
use crate::common::{init_tracing, with_timeout};

use std::io::{self, Write};
use std::time::Duration;

use coderun::cli::CliArgs;
use coderun::errors::{CoderunError, RunError};
use coderun::exec::{Runner, RunnerOptions, StepOutcome, StreamKind, SystemSpawner};
use coderun::resolve::Resolver;
use coderun_test_utils::builders::{ConfigFileBuilder, PlanBuilder};
use clap::Parser;

#[tokio::test]
async fn direct_spawn_captures_stdout() {
    with_timeout(async {
        init_tracing();

        let runner = Runner::new(SystemSpawner::direct(), RunnerOptions::default());
        let plan = PlanBuilder::new("adhoc", "-").run("echo hello world").build();

        let result = runner.run(&plan).await.unwrap();

        assert_eq!(
            result.lines(StreamKind::Stdout).collect::<Vec<_>>(),
            vec!["hello world"]
        );
        assert_eq!(result.exit_code(), Some(0));
    })
    .await
}

#[tokio::test]
async fn direct_spawn_does_not_interpret_shell_syntax() {
    with_timeout(async {
        let runner = Runner::new(SystemSpawner::direct(), RunnerOptions::default());
        let plan = PlanBuilder::new("adhoc", "-").run("echo a && echo b").build();

        let result = runner.run(&plan).await.unwrap();

        assert_eq!(
            result.lines(StreamKind::Stdout).collect::<Vec<_>>(),
            vec!["a && echo b"]
        );
    })
    .await
}

#[tokio::test]
async fn failing_program_reports_exit_code() {
    with_timeout(async {
        let runner = Runner::new(SystemSpawner::direct(), RunnerOptions::default());
        let plan = PlanBuilder::new("adhoc", "-").compile("false").run("echo never").build();

        let result = runner.run(&plan).await.unwrap();

        assert_eq!(result.steps[0].outcome, StepOutcome::Exited(1));
        assert_eq!(result.skipped.len(), 1);
        assert!(!result.success());
    })
    .await
}

#[tokio::test]
async fn missing_program_is_a_spawn_error() {
    with_timeout(async {
        let runner = Runner::new(SystemSpawner::direct(), RunnerOptions::default());
        let plan = PlanBuilder::new("adhoc", "-")
            .run("coderun-definitely-missing-toolchain --version")
            .build();

        let err = runner.run(&plan).await.unwrap_err();

        assert!(err.is_total());
        match err.error() {
            RunError::Spawn { source, .. } => assert_eq!(source.kind(), io::ErrorKind::NotFound),
            other => panic!("expected spawn error, got {other:?}"),
        }
    })
    .await
}

#[tokio::test]
async fn shell_mode_captures_both_streams() {
    with_timeout(async {
        let runner = Runner::new(SystemSpawner::shell(), RunnerOptions::default());
        let plan = PlanBuilder::new("adhoc", "-")
            .run("echo out; echo err 1>&2; exit 3")
            .build();

        let result = runner.run(&plan).await.unwrap();

        assert_eq!(result.lines(StreamKind::Stdout).collect::<Vec<_>>(), vec!["out"]);
        assert_eq!(result.lines(StreamKind::Stderr).collect::<Vec<_>>(), vec!["err"]);
        assert_eq!(result.exit_code(), Some(3));
    })
    .await
}

#[tokio::test]
async fn shell_mode_interleaves_by_arrival() {
    with_timeout(async {
        let runner = Runner::new(SystemSpawner::shell(), RunnerOptions::default());
        let plan = PlanBuilder::new("adhoc", "-")
            .run("echo first 1>&2; sleep 0.2; echo second")
            .build();

        let result = runner.run(&plan).await.unwrap();

        let streams: Vec<StreamKind> = result.output.iter().map(|l| l.stream).collect();
        assert_eq!(streams, vec![StreamKind::Stderr, StreamKind::Stdout]);
    })
    .await
}

#[tokio::test]
async fn timeout_kills_long_running_process() {
    with_timeout(async {
        let options = RunnerOptions {
            timeout: Some(Duration::from_millis(200)),
            ..RunnerOptions::default()
        };
        let runner = Runner::new(SystemSpawner::direct(), options);
        let plan = PlanBuilder::new("adhoc", "-").run("sleep 30").build();

        let result = runner.run(&plan).await.unwrap();

        assert_eq!(result.steps[0].outcome, StepOutcome::TimedOut);
        assert!(result.steps[0].elapsed < Duration::from_secs(5));
    })
    .await
}

#[tokio::test]
async fn output_cap_stops_endless_producer() {
    with_timeout(async {
        let options = RunnerOptions {
            timeout: Some(Duration::from_secs(3)),
            max_output_bytes: Some(100),
            ..RunnerOptions::default()
        };
        let runner = Runner::new(SystemSpawner::direct(), options);
        let plan = PlanBuilder::new("adhoc", "-").run("yes").build();

        let result = runner.run(&plan).await.unwrap();

        assert_eq!(result.steps[0].outcome, StepOutcome::OutputLimit);
        assert!(result.steps[0].elapsed < Duration::from_secs(1));
        assert!(result.truncated);
        assert_eq!(result.lines(StreamKind::Stdout).count(), 100);
    })
    .await
}

#[tokio::test]
async fn input_reaches_program_stdin() {
    with_timeout(async {
        let options = RunnerOptions {
            input: Some("piped line\n".to_string()),
            ..RunnerOptions::default()
        };
        let runner = Runner::new(SystemSpawner::direct(), options);
        let plan = PlanBuilder::new("adhoc", "-").run("cat").build();

        let result = runner.run(&plan).await.unwrap();

        assert_eq!(
            result.lines(StreamKind::Stdout).collect::<Vec<_>>(),
            vec!["piped line"]
        );
    })
    .await
}

#[tokio::test]
async fn configured_script_language_runs_end_to_end() {
    with_timeout(async {
        init_tracing();

        let mut script = tempfile::Builder::new().suffix(".sh").tempfile().unwrap();
        writeln!(script, "echo from-script").unwrap();
        writeln!(script, "echo oops 1>&2").unwrap();
        writeln!(script, "exit 4").unwrap();
        let file_name = script.path().to_str().unwrap().to_string();

        let cfg = ConfigFileBuilder::new()
            .language("sh", &[".sh"], None, "sh {file}")
            .build();
        let plan = Resolver::with_configured(&cfg.language).resolve(&file_name).unwrap();
        assert_eq!(plan.commands(), vec![format!("sh {file_name}")]);

        let runner = Runner::new(SystemSpawner::direct(), RunnerOptions::default());
        let result = runner.run(&plan).await.unwrap();

        assert_eq!(
            result.lines(StreamKind::Stdout).collect::<Vec<_>>(),
            vec!["from-script"]
        );
        assert_eq!(result.lines(StreamKind::Stderr).collect::<Vec<_>>(), vec!["oops"]);
        assert_eq!(result.exit_code(), Some(4));
    })
    .await
}

#[tokio::test]
async fn cli_run_returns_program_exit_code() {
    with_timeout(async {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("Coderun.toml");
        std::fs::write(
            &config,
            "[language.sh]\nextensions = [\".sh\"]\nrun = \"sh {file}\"\n",
        )
        .unwrap();
        let script = dir.path().join("exit7.sh");
        std::fs::write(&script, "exit 7\n").unwrap();

        let args = CliArgs::try_parse_from([
            "coderun",
            "--config",
            config.to_str().unwrap(),
            script.to_str().unwrap(),
        ])
        .unwrap();

        let code = coderun::run(args).await.unwrap();
        assert_eq!(code, 7);
    })
    .await
}

#[tokio::test]
async fn cli_run_surfaces_spawn_failure() {
    with_timeout(async {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("Coderun.toml");
        std::fs::write(
            &config,
            "[language.fake]\nextensions = [\".fake\"]\nrun = \"coderun-definitely-missing-toolchain {file}\"\n",
        )
        .unwrap();

        let args = CliArgs::try_parse_from([
            "coderun",
            "--config",
            config.to_str().unwrap(),
            "prog.fake",
        ])
        .unwrap();

        match coderun::run(args).await {
            Err(CoderunError::Run(failure)) => assert!(failure.is_total()),
            other => panic!("expected run failure, got {other:?}"),
        }
    })
    .await
}
