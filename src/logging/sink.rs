use crate::error::{ClautoError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};

/// Where log lines end up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    /// `<dir>/<module>.log`
    Directory(Utf8PathBuf),
}

/// Path of the log file for `module` inside `log_dir`
pub fn log_file_path(log_dir: &Utf8Path, module: &str) -> Utf8PathBuf {
    log_dir.join(format!("{module}.log"))
}

/// The single open output of a Log
pub(crate) enum LogSink {
    Stdout(io::Stdout),
    File {
        path: Utf8PathBuf,
        writer: LineWriter<File>,
    },
}

impl LogSink {
    pub(crate) fn stdout() -> Self {
        Self::Stdout(io::stdout())
    }

    /// Create or truncate `<log_dir>/<module>.log` for writing
    pub(crate) fn open(log_dir: &Utf8Path, module: &str) -> Result<Self> {
        let path = log_file_path(log_dir, module);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|source| ClautoError::LogFileUnwritable {
                path: path.clone(),
                source,
            })?;

        Ok(Self::File {
            path,
            writer: LineWriter::new(file),
        })
    }

    /// Write one line. Output errors are dropped; logging never fails the caller.
    pub(crate) fn write_line(&mut self, line: &str) {
        let _ = match self {
            Self::Stdout(stdout) => writeln!(stdout.lock(), "{line}"),
            Self::File { writer, .. } => writeln!(writer, "{line}"),
        };
    }

    pub(crate) fn flush(&mut self) {
        let _ = match self {
            Self::Stdout(stdout) => stdout.flush(),
            Self::File { writer, .. } => writer.flush(),
        };
    }

    pub(crate) fn path(&self) -> Option<&Utf8Path> {
        match self {
            Self::Stdout(_) => None,
            Self::File { path, .. } => Some(path),
        }
    }
}
