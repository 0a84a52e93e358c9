//! Background line reader
//!
//! Drains device output one byte at a time, reassembles lines on CR/LF and
//! hands each line to the session filter. Runs on a dedicated thread because
//! port reads block; the foreground stops it through a [`CancelToken`].

use std::io::{BufReader, ErrorKind, Read};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::error::Result;
use crate::logging::LineSink;
use crate::session::SharedState;

/// Consecutive hard read errors tolerated before the reader gives up
const MAX_CONSECUTIVE_ERRORS: u32 = 5;

/// Pause between retries after a hard read error
const ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Accumulates bytes into CR/LF terminated lines
#[derive(Debug, Default)]
pub struct LineAssembler {
    buffer: Vec<u8>,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte, returning a line when `byte` terminates one.
    ///
    /// Each of `\r` and `\n` ends a line on its own, so CR LF produces the
    /// line followed by an empty one.
    pub fn push(&mut self, byte: u8) -> Option<String> {
        match byte {
            b'\n' | b'\r' => {
                let line = String::from_utf8_lossy(&self.buffer).into_owned();
                self.buffer.clear();
                Some(line)
            }
            _ => {
                self.buffer.push(byte);
                None
            }
        }
    }

    /// Take whatever has been buffered without a terminator
    pub fn take_partial(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();
        Some(line)
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

/// Cooperative stop flag shared with the reader thread
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Why the reader stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderExit {
    /// Stopped on request
    Cancelled,
    /// The device reported end of stream
    Disconnected,
    /// Reads kept failing
    Failed(String),
}

impl ReaderExit {
    pub fn is_fault(&self) -> bool {
        !matches!(self, ReaderExit::Cancelled)
    }
}

impl std::fmt::Display for ReaderExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReaderExit::Cancelled => write!(f, "reader cancelled"),
            ReaderExit::Disconnected => write!(f, "device disconnected"),
            ReaderExit::Failed(reason) => write!(f, "device read failed: {}", reason),
        }
    }
}

/// Line counters maintained by the reader
#[derive(Debug, Default)]
pub struct ReaderStats {
    lines_received: AtomicU64,
    lines_logged: AtomicU64,
}

impl ReaderStats {
    pub fn lines_received(&self) -> u64 {
        self.lines_received.load(Ordering::Relaxed)
    }

    pub fn lines_logged(&self) -> u64 {
        self.lines_logged.load(Ordering::Relaxed)
    }

    fn record(&self, logged: bool) {
        self.lines_received.fetch_add(1, Ordering::Relaxed);
        if logged {
            self.lines_logged.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Run the filter on one completed line and record it if it passes
fn process_line(line: &str, state: &SharedState, sink: &dyn LineSink) {
    let logged = state.filter().should_log(line);
    if logged {
        sink.record(line);
    }
    state.stats().record(logged);
}

/// Read from `source` until cancelled, disconnected or persistently failing.
///
/// Timeouts and interrupted reads are expected (the port has a short read
/// timeout) and only serve as cancellation checkpoints.
pub fn run_reader<R: Read>(
    source: R,
    state: &SharedState,
    sink: &dyn LineSink,
    cancel: &CancelToken,
) -> ReaderExit {
    let mut source = BufReader::new(source);
    let mut assembler = LineAssembler::new();
    let mut byte = [0u8; 1];
    let mut consecutive_errors = 0;

    let exit = loop {
        if cancel.is_cancelled() {
            break ReaderExit::Cancelled;
        }

        match source.read(&mut byte) {
            Ok(0) => {
                debug!("Serial read EOF");
                break ReaderExit::Disconnected;
            }
            Ok(_) => {
                consecutive_errors = 0;
                if let Some(line) = assembler.push(byte[0]) {
                    process_line(&line, state, sink);
                }
            }
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
                ) =>
            {
                continue;
            }
            Err(e) => {
                consecutive_errors += 1;
                warn!(
                    "Serial read error ({}): {} (attempt {}/{})",
                    e.kind(),
                    e,
                    consecutive_errors,
                    MAX_CONSECUTIVE_ERRORS
                );

                if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                    break ReaderExit::Failed(e.to_string());
                }
                thread::sleep(ERROR_BACKOFF);
            }
        }
    };

    if let Some(line) = assembler.take_partial() {
        process_line(&line, state, sink);
    }

    debug!("Serial reader exiting: {}", exit);
    exit
}

/// Handle to a reader running on its own thread
pub struct ReaderHandle {
    cancel: CancelToken,
    done: Option<oneshot::Receiver<ReaderExit>>,
    thread: Option<JoinHandle<()>>,
}

impl ReaderHandle {
    /// Resolve when the reader stops on its own.
    ///
    /// Cancel safe. Once it has resolved, later calls never complete.
    pub async fn finished(&mut self) -> ReaderExit {
        let Some(done) = self.done.as_mut() else {
            return std::future::pending().await;
        };

        let exit = done
            .await
            .unwrap_or_else(|_| ReaderExit::Failed("reader thread panicked".to_string()));
        self.done = None;
        exit
    }

    /// Cancel the reader and wait up to `grace` for it to stop.
    ///
    /// Returns `None` if the reader had already reported its exit or did not
    /// stop in time; a reader stuck in a read is left behind.
    pub async fn shutdown(mut self, grace: Duration) -> Option<ReaderExit> {
        self.cancel.cancel();

        let exit = match self.done.take() {
            None => None,
            Some(done) => match tokio::time::timeout(grace, done).await {
                Ok(Ok(exit)) => Some(exit),
                Ok(Err(_)) => Some(ReaderExit::Failed("reader thread panicked".to_string())),
                Err(_) => {
                    warn!("Serial reader did not stop within {:?}", grace);
                    return None;
                }
            },
        };

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Serial reader thread panicked during shutdown");
            }
        }
        exit
    }
}

/// Start the reader on a dedicated thread
pub fn spawn_reader<R>(
    source: R,
    state: Arc<SharedState>,
    sink: Arc<dyn LineSink>,
) -> Result<ReaderHandle>
where
    R: Read + Send + 'static,
{
    let cancel = CancelToken::new();
    let token = cancel.clone();
    let (tx, rx) = oneshot::channel();

    let thread = thread::Builder::new()
        .name("serial-reader".to_string())
        .spawn(move || {
            let exit = run_reader(source, &state, sink.as_ref(), &token);
            let _ = tx.send(exit);
        })?;

    Ok(ReaderHandle {
        cancel,
        done: Some(rx),
        thread: Some(thread),
    })
}
