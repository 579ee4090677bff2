use std::collections::HashMap;
use std::io::{self, Cursor};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use coderun::exec::spawner::{BoxFuture, BoxedWriter};
use coderun::exec::{ProcessHandle, ProcessSpawner, SpawnedProcess};
use tokio::io::AsyncWrite;

/// Scripted behaviour for one command line.
#[derive(Debug, Clone)]
pub struct FakeProcess {
    stdout: String,
    stderr: String,
    exit_code: Option<i32>,
    hang: bool,
}

impl FakeProcess {
    /// A process that prints nothing and exits with `code`.
    pub fn exits(code: i32) -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: Some(code),
            hang: false,
        }
    }

    /// A process that ends without an exit code.
    pub fn signalled() -> Self {
        Self {
            exit_code: None,
            ..Self::exits(0)
        }
    }

    /// A process whose `wait` never completes until it is killed.
    pub fn hangs() -> Self {
        Self {
            hang: true,
            ..Self::exits(0)
        }
    }

    pub fn stdout(mut self, text: &str) -> Self {
        self.stdout.push_str(text);
        self
    }

    pub fn stderr(mut self, text: &str) -> Self {
        self.stderr.push_str(text);
        self
    }
}

#[derive(Debug, Clone)]
enum Script {
    Process(FakeProcess),
    SpawnError(io::ErrorKind),
}

/// A fake spawner that:
/// - records which command lines were spawned, in order
/// - records what each process received on stdin
/// - plays back scripted output and exit codes
///
/// Unscripted commands fail to spawn with `NotFound`, like a missing
/// toolchain would.
#[derive(Debug, Clone, Default)]
pub struct FakeSpawner {
    scripts: HashMap<String, Script>,
    spawned: Arc<Mutex<Vec<String>>>,
    stdin: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl FakeSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_process(mut self, command: &str, process: FakeProcess) -> Self {
        self.scripts.insert(command.to_string(), Script::Process(process));
        self
    }

    pub fn with_spawn_error(mut self, command: &str, kind: io::ErrorKind) -> Self {
        self.scripts.insert(command.to_string(), Script::SpawnError(kind));
        self
    }

    /// Shared handle to the spawned command log.
    pub fn spawned(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.spawned)
    }

    /// Bytes written to `command`'s stdin, if it had a piped stdin.
    pub fn stdin_of(&self, command: &str) -> Option<String> {
        let guard = self.stdin.lock().unwrap();
        guard
            .get(command)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl ProcessSpawner for FakeSpawner {
    fn spawn(&self, command: &str, pipe_stdin: bool) -> io::Result<SpawnedProcess> {
        {
            let mut guard = self.spawned.lock().unwrap();
            guard.push(command.to_string());
        }

        let process = match self.scripts.get(command) {
            Some(Script::Process(p)) => p.clone(),
            Some(Script::SpawnError(kind)) => {
                return Err(io::Error::new(*kind, format!("fake spawn failure for `{command}`")));
            }
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no fake process scripted for `{command}`"),
                ));
            }
        };

        let stdin = if pipe_stdin {
            self.stdin
                .lock()
                .unwrap()
                .insert(command.to_string(), Vec::new());
            Some(Box::new(RecordingStdin {
                command: command.to_string(),
                sink: Arc::clone(&self.stdin),
            }) as BoxedWriter)
        } else {
            None
        };

        Ok(SpawnedProcess {
            stdout: Box::new(Cursor::new(process.stdout.into_bytes())),
            stderr: Box::new(Cursor::new(process.stderr.into_bytes())),
            stdin,
            handle: Box::new(FakeHandle {
                exit_code: process.exit_code,
                hang: process.hang,
            }),
        })
    }
}

struct FakeHandle {
    exit_code: Option<i32>,
    hang: bool,
}

impl ProcessHandle for FakeHandle {
    fn wait(&mut self) -> BoxFuture<'_, io::Result<Option<i32>>> {
        let hang = self.hang;
        let code = self.exit_code;
        Box::pin(async move {
            if hang {
                std::future::pending::<()>().await;
            }
            Ok::<_, io::Error>(code)
        })
    }

    fn kill(&mut self) -> BoxFuture<'_, io::Result<()>> {
        self.hang = false;
        self.exit_code = None;
        Box::pin(async { Ok::<_, io::Error>(()) })
    }
}

struct RecordingStdin {
    command: String,
    sink: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl AsyncWrite for RecordingStdin {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut guard = self.sink.lock().unwrap();
        guard
            .entry(self.command.clone())
            .or_default()
            .extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
