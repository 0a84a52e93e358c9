//! Session logging
//!
//! Every session writes an append-only log file named after its start time
//! and mirrors the same records to stderr. Device lines that pass the filter
//! reach the log through a [`LineSink`].

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{Error, Result};

/// Timestamp format of log records
const RECORD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Log file name format, taken from the session start time
const FILE_TIME_FORMAT: &str = "%Y%m%d-%H:%M:%S%.3f";

/// Default filter directive when `RUST_LOG` is unset
const DEFAULT_DIRECTIVE: &str = "info";

/// Target of accepted device lines
pub const DEVICE_TARGET: &str = "device";

/// Always appended so `RUST_LOG` never hides device lines
const DEVICE_DIRECTIVE: &str = "device=info";

/// Destination for device lines accepted by the filter
pub trait LineSink: Send + Sync {
    fn record(&self, line: &str);
}

/// Records device lines as `INFO` events on the `device` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LineSink for TracingSink {
    fn record(&self, line: &str) {
        info!(target: DEVICE_TARGET, "{}", line);
    }
}

/// Keeps recorded lines in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: parking_lot::Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl LineSink for MemorySink {
    fn record(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

/// Path of the log file for a session started at `started`
pub fn session_log_path(session_dir: &Path, started: DateTime<Local>) -> PathBuf {
    session_dir.join(format!("{}.log", started.format(FILE_TIME_FORMAT)))
}

/// Diagnostic filter from `directives` (normally `RUST_LOG`), with device
/// lines enabled at `INFO` whatever the directives say.
pub fn build_filter(directives: Option<&str>) -> Result<EnvFilter> {
    let filter = directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE));

    let device: Directive = DEVICE_DIRECTIVE.parse().map_err(|e| Error::LoggingInit {
        reason: format!("{}: {}", DEVICE_DIRECTIVE, e),
    })?;
    Ok(filter.add_directive(device))
}

/// Install the global subscriber: stderr plus the session log file.
///
/// Returns the path of the log file. `RUST_LOG` overrides the default level.
pub fn init(session_dir: &Path, started: DateTime<Local>) -> Result<PathBuf> {
    init_with_mirror(session_dir, started, std::io::stderr)
}

/// Like [`init`], mirroring records to `mirror` instead of stderr
pub fn init_with_mirror<M>(
    session_dir: &Path,
    started: DateTime<Local>,
    mirror: M,
) -> Result<PathBuf>
where
    M: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let path = session_log_path(session_dir, started);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| Error::LoggingInit {
            reason: format!("{}: {}", path.display(), e),
        })?;

    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let env_filter = build_filter(directives.as_deref())?;

    let stderr_layer = fmt::layer()
        .with_writer(mirror)
        .with_target(false)
        .with_timer(ChronoLocal::new(RECORD_TIME_FORMAT.to_string()));

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_timer(ChronoLocal::new(RECORD_TIME_FORMAT.to_string()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::LoggingInit {
            reason: e.to_string(),
        })?;

    Ok(path)
}
