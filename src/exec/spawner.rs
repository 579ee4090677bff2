// src/exec/spawner.rs

//! Pluggable process spawning.
//!
//! The [`Runner`](super::Runner) talks to a `ProcessSpawner` instead of
//! `tokio::process::Command` directly, so tests can swap in scripted
//! processes while production uses [`SystemSpawner`].

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::{Child, Command};
use tracing::debug;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Control over a spawned process once its pipes have been taken.
pub trait ProcessHandle: Send {
    /// Wait for the process to exit.
    ///
    /// `Ok(None)` means the process ended without an exit code (signal).
    fn wait(&mut self) -> BoxFuture<'_, io::Result<Option<i32>>>;

    /// Kill the process and reap it.
    fn kill(&mut self) -> BoxFuture<'_, io::Result<()>>;
}

/// A started process with its standard streams.
pub struct SpawnedProcess {
    pub stdout: BoxedReader,
    pub stderr: BoxedReader,
    /// Present only when the spawner was asked for a piped stdin.
    pub stdin: Option<BoxedWriter>,
    pub handle: Box<dyn ProcessHandle>,
}

/// Trait abstracting how a command line becomes a running process.
pub trait ProcessSpawner: Send + Sync {
    /// Start `command`. With `pipe_stdin = false` the child gets a null stdin.
    fn spawn(&self, command: &str, pipe_stdin: bool) -> io::Result<SpawnedProcess>;
}

/// Spawner backed by `tokio::process::Command`.
///
/// - direct mode (default): the command line is split on whitespace and the
///   first token is executed with the rest as arguments. No shell is
///   involved, so metacharacters like `&&` or `;` are passed through as
///   plain arguments.
/// - shell mode: the whole line goes to `sh -c` (`cmd /C` on Windows).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemSpawner {
    shell: bool,
}

impl SystemSpawner {
    pub fn new(shell: bool) -> Self {
        Self { shell }
    }

    pub fn direct() -> Self {
        Self::new(false)
    }

    pub fn shell() -> Self {
        Self::new(true)
    }

    fn build_command(&self, line: &str) -> io::Result<Command> {
        if self.shell {
            // Build a shell command appropriate for the platform.
            let cmd = if cfg!(windows) {
                let mut c = Command::new("cmd");
                c.arg("/C").arg(line);
                c
            } else {
                let mut c = Command::new("sh");
                c.arg("-c").arg(line);
                c
            };
            return Ok(cmd);
        }

        let mut tokens = line.split_whitespace();
        let program = tokens
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command line"))?;
        let mut cmd = Command::new(program);
        cmd.args(tokens);
        Ok(cmd)
    }
}

impl ProcessSpawner for SystemSpawner {
    fn spawn(&self, command: &str, pipe_stdin: bool) -> io::Result<SpawnedProcess> {
        let mut cmd = self.build_command(command)?;

        cmd.stdin(if pipe_stdin { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn()?;
        debug!(command = %command, pid = ?child.id(), shell = self.shell, "spawned process");

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("child stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("child stderr was not captured"))?;
        let stdin = child
            .stdin
            .take()
            .map(|s| Box::new(s) as BoxedWriter);

        Ok(SpawnedProcess {
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
            stdin,
            handle: Box::new(ChildHandle(child)),
        })
    }
}

/// `kill_on_drop(true)` is set on the command, so dropping this handle on
/// any early-return path also terminates the process.
struct ChildHandle(Child);

impl ProcessHandle for ChildHandle {
    fn wait(&mut self) -> BoxFuture<'_, io::Result<Option<i32>>> {
        Box::pin(async move {
            let status = self.0.wait().await?;
            Ok::<_, io::Error>(status.code())
        })
    }

    fn kill(&mut self) -> BoxFuture<'_, io::Result<()>> {
        Box::pin(self.0.kill())
    }
}
