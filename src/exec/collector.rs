// src/exec/collector.rs

//! Concurrent stdout/stderr draining.
//!
//! Each stream gets its own Tokio task that owns its line buffer outright.
//! The tasks are started right after spawn so the child never blocks on a
//! full pipe, and are joined before the result is built.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::types::StreamKind;

/// Lines collected from both streams, each in its original order.
#[derive(Debug, Default)]
pub struct CollectedOutput {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    /// True if at least one reader had to be stopped before reaching EOF.
    pub truncated: bool,
}

/// Drains a child's stdout and stderr until EOF or until told to stop.
///
/// Dropping the collector aborts any reader that is still running.
pub struct StreamCollector {
    stdout: ReaderTask,
    stderr: ReaderTask,
}

impl StreamCollector {
    /// Start draining both streams immediately.
    pub fn spawn<O, E>(stdout: O, stderr: E) -> Self
    where
        O: AsyncRead + Unpin + Send + 'static,
        E: AsyncRead + Unpin + Send + 'static,
    {
        Self {
            stdout: ReaderTask::spawn(StreamKind::Stdout, stdout),
            stderr: ReaderTask::spawn(StreamKind::Stderr, stderr),
        }
    }

    /// Wait for both readers to hit EOF, giving up after `grace`.
    ///
    /// A reader still running when `grace` elapses is stopped and whatever it
    /// collected so far is returned.
    pub async fn finish_within(mut self, grace: Duration) -> CollectedOutput {
        let ((stdout, out_cut), (stderr, err_cut)) =
            tokio::join!(self.stdout.finish_within(grace), self.stderr.finish_within(grace));

        CollectedOutput {
            stdout,
            stderr,
            truncated: out_cut || err_cut,
        }
    }
}

struct ReaderTask {
    kind: StreamKind,
    handle: Option<JoinHandle<Vec<String>>>,
    stop: Option<oneshot::Sender<()>>,
}

impl ReaderTask {
    fn spawn<R>(kind: StreamKind, reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(read_lines(kind, reader, stop_rx));
        Self {
            kind,
            handle: Some(handle),
            stop: Some(stop_tx),
        }
    }

    /// Returns the collected lines and whether the reader had to be stopped.
    async fn finish_within(&mut self, grace: Duration) -> (Vec<String>, bool) {
        let Some(mut handle) = self.handle.take() else {
            return (Vec::new(), false);
        };

        let (joined, stopped) = match tokio::time::timeout(grace, &mut handle).await {
            Ok(joined) => (joined, false),
            Err(_) => {
                debug!(stream = %self.kind, ?grace, "stream still open; stopping reader");
                if let Some(stop) = self.stop.take() {
                    let _ = stop.send(());
                }
                (handle.await, true)
            }
        };

        match joined {
            Ok(lines) => (lines, stopped),
            Err(e) => {
                warn!(stream = %self.kind, error = %e, "stream reader task failed");
                (Vec::new(), true)
            }
        }
    }
}

impl Drop for ReaderTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn read_lines<R>(
    kind: StreamKind,
    reader: R,
    mut stop_rx: oneshot::Receiver<()>,
) -> Vec<String>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut lines = Vec::new();
    let mut buf = Vec::new();

    loop {
        // Bytes read before a stop land in `buf` and are kept as a final
        // partial line.
        let read = tokio::select! {
            res = reader.read_until(b'\n', &mut buf) => res,
            _ = &mut stop_rx => {
                if !buf.is_empty() {
                    lines.push(decode_line(&buf));
                }
                debug!(stream = %kind, lines = lines.len(), "reader stopped before EOF");
                return lines;
            }
        };

        match read {
            Ok(0) => break,
            Ok(_) => {
                let line = decode_line(&buf);
                trace!(stream = %kind, "{}", line);
                lines.push(line);
                buf.clear();
            }
            Err(e) => {
                warn!(stream = %kind, error = %e, "failed reading child stream");
                lines.push(format!("[cmdrun: {} read failed: {}]", kind, e));
                break;
            }
        }
    }

    debug!(stream = %kind, lines = lines.len(), "stream reached EOF");
    lines
}

/// Decode one line as UTF-8 (lossy) and strip the line terminator.
fn decode_line(buf: &[u8]) -> String {
    let mut end = buf.len();
    if end > 0 && buf[end - 1] == b'\n' {
        end -= 1;
        if end > 0 && buf[end - 1] == b'\r' {
            end -= 1;
        }
    }
    String::from_utf8_lossy(&buf[..end]).into_owned()
}
