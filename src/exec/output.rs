// src/exec/output.rs

//! Captured output lines and the helpers that produce them.

use std::fmt;
use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Which standard stream a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    /// Prefix used when printing captured lines.
    pub fn prefix(self) -> &'static str {
        match self {
            StreamKind::Stdout => "OUT",
            StreamKind::Stderr => "ERR",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => f.write_str("stdout"),
            StreamKind::Stderr => f.write_str("stderr"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    /// Index of the plan step that printed the line.
    pub step: usize,
    pub stream: StreamKind,
    pub text: String,
}

/// Reads `\n`-terminated lines, decoding lossily.
///
/// `next_line` is cancel safe: bytes of a partially read line stay in the
/// internal buffer and the next call continues the same line, so it can be
/// raced in `tokio::select!`.
pub struct LineReader<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            buf: Vec::new(),
        }
    }

    /// Next line without its `\n` / `\r\n`, or `None` at end of stream.
    ///
    /// At most `max_len` bytes are buffered for one line. A longer line is
    /// returned cut at `max_len` and its remainder comes back as the next
    /// line.
    pub async fn next_line(&mut self, max_len: usize) -> io::Result<Option<String>> {
        let max_len = max_len.max(1);
        loop {
            let available = self.reader.fill_buf().await?;
            if available.is_empty() {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(self.take_line()));
            }

            let room = max_len.saturating_sub(self.buf.len());
            let window = &available[..available.len().min(room)];
            let (used, complete) = match window.iter().position(|&b| b == b'\n') {
                Some(pos) => (pos + 1, true),
                None => (window.len(), false),
            };
            self.buf.extend_from_slice(&window[..used]);
            self.reader.consume(used);

            if complete || self.buf.len() >= max_len {
                return Ok(Some(self.take_line()));
            }
        }
    }

    fn take_line(&mut self) -> String {
        let mut bytes = std::mem::take(&mut self.buf);
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// Ordered collector shared by every step of a run.
#[derive(Debug, Default)]
pub struct OutputSink {
    lines: Vec<OutputLine>,
    bytes: usize,
    limit: Option<usize>,
    truncated: bool,
}

impl OutputSink {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Longest line worth reading: what the cap still accepts plus room for
    /// a `\r\n`, so an oversized line is seen and refused.
    pub fn line_budget(&self) -> usize {
        match self.limit {
            Some(limit) => limit.saturating_sub(self.bytes).saturating_add(2),
            None => usize::MAX,
        }
    }

    /// Record a line unless the byte cap has been reached. Returns `false`
    /// once a line has been refused; every later line is refused too.
    pub fn push(&mut self, step: usize, stream: StreamKind, text: String) -> bool {
        if self.truncated {
            return false;
        }
        if let Some(limit) = self.limit {
            if self.bytes + text.len() > limit {
                self.truncated = true;
                return false;
            }
        }
        self.bytes += text.len();
        self.lines.push(OutputLine { step, stream, text });
        true
    }

    pub fn into_parts(self) -> (Vec<OutputLine>, bool) {
        (self.lines, self.truncated)
    }
}
