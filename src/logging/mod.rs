//! Process-wide structured log.
//!
//! [`Log`] is a shared-state singleton: every `Log::new()` against the same
//! [`StateRegistry`] returns a handle onto one sink, one threshold and one formatter. The
//! first construction decides where output goes; later constructions never change it.
//!
//! # Line format
//!
//! ```text
//! [2024-03-09 07:05:02.007][INF] Logging initialized
//! [2024-03-09 07:05:02.011][DBG][clautod/main.rs:42] Connected to database
//! ```
//!
//! DEBUG and VERBOSE lines carry the caller's source location; every other level doesn't.
//! The level tokens (`CRT, CFG, ERR, WRN, INF, DBG, VRB`) are read by existing log tooling
//! and must not change.
//!
//! # Usage
//!
//! ```no_run
//! use clauto_common::{log_debug, log_info, Log, Severity, StateRegistry};
//! use camino::Utf8Path;
//!
//! let log = Log::new(StateRegistry::global(), "clautod", Some(Utf8Path::new("/var/log/clauto")))?;
//! log.set_level(Severity::Debug);
//! log_info!(log, "Listening on port {}", 8080);
//! log_debug!(log, "Worker pool size <{}>", 4);
//! # Ok::<(), clauto_common::ClautoError>(())
//! ```

pub mod bridge;
pub mod format;
pub mod severity;
mod sink;

pub use bridge::{LogLayer, install_tracing_bridge};
pub use format::{LogFormatter, LogRecord, SourceLocation};
pub use severity::{FormatProfile, Severity, UnknownSeverity};
pub use sink::{LogTarget, log_file_path};

use crate::error::Result;
use crate::state::{SharedState, StateKey, StateRegistry};
use camino::{Utf8Path, Utf8PathBuf};
use sink::LogSink;
use std::fmt;
use std::panic::Location;

/// Module name used when a component attaches to the Log without naming itself
pub const DEFAULT_MODULE: &str = "clauto-common";

/// Threshold a fresh Log starts with
pub const DEFAULT_LEVEL: Severity = Severity::Info;

struct LogState {
    module: String,
    target: LogTarget,
    sink: LogSink,
    level: Severity,
    formatter: LogFormatter,
}

/// Handle to the shared log
///
/// Cheap to clone; all clones write through the same sink.
#[derive(Clone, Debug)]
pub struct Log {
    state: SharedState<LogState>,
}

impl Log {
    /// Attach to the shared log, initializing it on first use.
    ///
    /// On the first call for a registry, output goes to `<log_dir>/<module>.log` (created or
    /// truncated) or to stdout when `log_dir` is `None`, the threshold is set to INF, and
    /// "Logging initialized" is written.
    ///
    /// Later calls leave the active configuration alone. If they name a different directory,
    /// or a module other than [`DEFAULT_MODULE`] that differs from the active one, a DEBUG
    /// advisory is written and the request is otherwise ignored.
    ///
    /// # Errors
    /// [`ClautoError::LogFileUnwritable`](crate::ClautoError::LogFileUnwritable) if the first
    /// call's log file can't be opened for writing.
    #[track_caller]
    pub fn new(registry: &StateRegistry, module: &str, log_dir: Option<&Utf8Path>) -> Result<Self> {
        let log = Self {
            state: registry.acquire(StateKey::LOG)?,
        };

        let created = log.state.initialize(|| {
            let (target, sink) = match log_dir {
                Some(dir) => (
                    LogTarget::Directory(dir.to_path_buf()),
                    LogSink::open(dir, module)?,
                ),
                None => (LogTarget::Stdout, LogSink::stdout()),
            };

            Ok(LogState {
                module: module.to_string(),
                target,
                sink,
                level: DEFAULT_LEVEL,
                formatter: LogFormatter::new(),
            })
        })?;

        if created {
            log.info(format_args!("Logging initialized"));
            return Ok(log);
        }

        if let Some(dir) = log_dir {
            if let LogTarget::Directory(active) = log.target() {
                if active.as_path() != dir {
                    log.debug(format_args!(
                        "Logging is already initialized with dir <{active}>. Not setting log dir to <{dir}>."
                    ));
                }
            } else {
                log.debug(format_args!(
                    "Logging is already initialized to STDOUT. Not setting log dir to <{dir}>."
                ));
            }
        }

        let active_module = log.module();
        if module != DEFAULT_MODULE && module != active_module {
            log.debug(format_args!(
                "Logging is already initialized with module <{active_module}>. Not setting module to <{module}>."
            ));
        }

        Ok(log)
    }

    /// Set the minimum severity that gets written
    pub fn set_level(&self, level: Severity) {
        self.state.update(|state| state.level = level);
    }

    pub fn level(&self) -> Severity {
        self.state.read(|state| state.level).unwrap_or(DEFAULT_LEVEL)
    }

    /// Whether a line at `severity` would be written
    pub fn enabled(&self, severity: Severity) -> bool {
        severity >= self.level()
    }

    pub fn module(&self) -> String {
        self.state
            .read(|state| state.module.clone())
            .unwrap_or_default()
    }

    pub fn target(&self) -> LogTarget {
        self.state
            .read(|state| state.target.clone())
            .unwrap_or(LogTarget::Stdout)
    }

    /// Path of the open log file, `None` when writing to stdout
    pub fn log_file_path(&self) -> Option<Utf8PathBuf> {
        self.state
            .read(|state| state.sink.path().map(Utf8Path::to_path_buf))
            .flatten()
    }

    /// Replace the formatter, e.g. to strip an extra installation root
    pub fn set_formatter(&self, formatter: LogFormatter) {
        self.state.update(|state| state.formatter = formatter);
    }

    /// Move output to `<new_dir>/<module>.log`.
    ///
    /// The new file is opened before the old sink is released, so a failed retarget leaves
    /// the current sink in place and still writing.
    ///
    /// # Errors
    /// [`ClautoError::LogFileUnwritable`](crate::ClautoError::LogFileUnwritable) if the new
    /// file can't be opened.
    #[track_caller]
    pub fn set_log_dir(&self, new_dir: &Utf8Path) -> Result<()> {
        let location = Location::caller();

        self.state
            .update(|state| -> Result<()> {
                let sink = LogSink::open(new_dir, &state.module)?;
                let mut old = std::mem::replace(&mut state.sink, sink);
                old.flush();
                state.target = LogTarget::Directory(new_dir.to_path_buf());
                Ok(())
            })
            .transpose()?;

        self.emit(
            Severity::Debug,
            format_args!("Log directory set to <{new_dir}>"),
            location.into(),
        );
        Ok(())
    }

    /// Flush buffered output
    pub fn flush(&self) {
        self.state.update(|state| state.sink.flush());
    }

    /// Flush and release the log file. Later lines go to stdout.
    pub fn shutdown(&self) {
        self.state.update(|state| {
            state.sink.flush();
            state.sink = LogSink::stdout();
            state.target = LogTarget::Stdout;
        });
    }

    /// Write one line at `severity`, tagged with the caller's location
    #[track_caller]
    pub fn log(&self, severity: Severity, message: fmt::Arguments<'_>) {
        self.emit(severity, message, Location::caller().into());
    }

    /// Write one line with an explicit source location
    ///
    /// Below-threshold calls return before any formatting happens.
    pub fn emit(
        &self,
        severity: Severity,
        message: fmt::Arguments<'_>,
        location: SourceLocation<'_>,
    ) {
        self.state.update(|state| {
            if severity < state.level {
                return;
            }
            let line = state
                .formatter
                .format(&LogRecord::now(severity, message, location));
            state.sink.write_line(&line);
        });
    }

    #[track_caller]
    pub fn critical(&self, message: fmt::Arguments<'_>) {
        self.log(Severity::Critical, message);
    }

    #[track_caller]
    pub fn config(&self, message: fmt::Arguments<'_>) {
        self.log(Severity::Config, message);
    }

    #[track_caller]
    pub fn error(&self, message: fmt::Arguments<'_>) {
        self.log(Severity::Error, message);
    }

    #[track_caller]
    pub fn warning(&self, message: fmt::Arguments<'_>) {
        self.log(Severity::Warning, message);
    }

    #[track_caller]
    pub fn info(&self, message: fmt::Arguments<'_>) {
        self.log(Severity::Info, message);
    }

    #[track_caller]
    pub fn debug(&self, message: fmt::Arguments<'_>) {
        self.log(Severity::Debug, message);
    }

    #[track_caller]
    pub fn verbose(&self, message: fmt::Arguments<'_>) {
        self.log(Severity::Verbose, message);
    }
}
