// Log line formatter
//
// Picks a layout per severity (see FormatProfile) and renders the caller's source location
// relative to the installation root, so lines read the same wherever the code is deployed.

use super::severity::{FormatProfile, Severity};
use chrono::{DateTime, Local};
use regex::Regex;
use std::fmt;
use std::panic::Location;
use std::sync::LazyLock;

/// Default installation root stripped from source paths
pub const DEFAULT_INSTALL_ROOT: &str = "/usr/share/clauto/";

/// Timestamp layout; milliseconds are appended zero-padded to three digits
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Cargo registry checkouts and vendored sources, up to the package directory
static PACKAGE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:.*[/\\])?(?:registry[/\\]src[/\\][^/\\]+|vendor)[/\\]")
        .expect("Invalid package prefix regex")
});

/// Where in the source a log call was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation<'a> {
    pub file: &'a str,
    pub line: u32,
}

impl From<&'static Location<'static>> for SourceLocation<'static> {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

/// One log event, alive only for a single format-and-emit call
#[derive(Debug, Clone, Copy)]
pub struct LogRecord<'a> {
    pub severity: Severity,
    pub message: fmt::Arguments<'a>,
    pub location: SourceLocation<'a>,
    pub timestamp: DateTime<Local>,
}

impl<'a> LogRecord<'a> {
    /// Record stamped with the current wall-clock time
    pub fn now(
        severity: Severity,
        message: fmt::Arguments<'a>,
        location: SourceLocation<'a>,
    ) -> Self {
        Self {
            severity,
            message,
            location,
            timestamp: Local::now(),
        }
    }
}

/// Renders [`LogRecord`]s into log lines (without the trailing newline)
#[derive(Debug, Clone)]
pub struct LogFormatter {
    install_roots: Vec<String>,
}

impl LogFormatter {
    pub fn new() -> Self {
        Self {
            install_roots: vec![DEFAULT_INSTALL_ROOT.to_string()],
        }
    }

    /// Add another directory prefix to strip from source paths
    pub fn with_install_root(mut self, root: impl Into<String>) -> Self {
        let mut root = root.into();
        if !root.ends_with('/') {
            root.push('/');
        }
        self.install_roots.push(root);
        self
    }

    /// Source path as shown in developer-profile lines
    pub fn relative_path<'p>(&self, path: &'p str) -> &'p str {
        let stripped = self
            .install_roots
            .iter()
            .find_map(|root| path.strip_prefix(root.as_str()))
            .unwrap_or(path);

        match PACKAGE_PREFIX.find(stripped) {
            Some(prefix) => &stripped[prefix.end()..],
            None => stripped,
        }
    }

    pub fn format(&self, record: &LogRecord<'_>) -> String {
        let timestamp = record.timestamp.format(TIMESTAMP_FORMAT);
        let level = record.severity.code();

        match record.severity.profile() {
            FormatProfile::User => format!("[{timestamp}][{level}] {}", record.message),
            FormatProfile::Developer => format!(
                "[{timestamp}][{level}][{}:{}] {}",
                self.relative_path(record.location.file),
                record.location.line,
                record.message
            ),
        }
    }
}

impl Default for LogFormatter {
    fn default() -> Self {
        Self::new()
    }
}
