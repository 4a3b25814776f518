//! Error types shared by every Clauto component.
//!
//! Two families live here:
//! - [`ClautoError`]: failures that abort a component's initialization (log sink, config file,
//!   shared state). These propagate to the owning process, which picks an exit code through
//!   [`crate::exitcodes`].
//! - [`ValidationError`]: rejected input at a service boundary. Recoverable by the caller.

use crate::exitcodes::{ExitCode, FailureCategory};
use camino::Utf8PathBuf;
use std::fmt;
use thiserror::Error;

/// Result alias for component-level operations
pub type Result<T, E = ClautoError> = std::result::Result<T, E>;

/// Startup-fatal and component-level failures
#[derive(Error, Debug)]
pub enum ClautoError {
    #[error("Log file is not writable: {path}")]
    LogFileUnwritable {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is already instantiated")]
    AlreadyInstantiated(String),

    #[error("Config must be given a file on its first instantiation")]
    EmptyConfigInstantiation,

    #[error("Config file is not readable: {path}")]
    ConfigFileUnreadable {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected line {line_number} in config file {path}: {line}")]
    ConfigParse {
        path: Utf8PathBuf,
        line_number: usize,
        line: String,
    },

    #[error("Setting missing from config file: <{0}>")]
    ConfigKeyMissing(String),

    #[error("Shared state <{key}> was first acquired with a different type")]
    StateTypeMismatch { key: String },

    #[error("Failed to install tracing bridge: {0}")]
    SubscriberInit(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ClautoError {
    /// Semantic category of this failure
    pub fn category(&self) -> FailureCategory {
        match self {
            Self::LogFileUnwritable { .. } => FailureCategory::LogFileUnwritable,
            Self::AlreadyInstantiated(_) => FailureCategory::AlreadyInstantiated,
            Self::EmptyConfigInstantiation => FailureCategory::EmptyConfigInstantiation,
            Self::ConfigFileUnreadable { .. } | Self::ConfigParse { .. } => {
                FailureCategory::ConfigFileUnreadable
            }
            Self::ConfigKeyMissing(_) => FailureCategory::ConfigKeyMissing,
            Self::StateTypeMismatch { .. } | Self::SubscriberInit(_) => FailureCategory::Unknown,
            Self::Validation(err) => err.category(),
        }
    }

    /// Exit code the owning process should terminate with
    pub fn exit_code(&self) -> ExitCode {
        self.category().exit_code()
    }
}

/// Why a candidate value was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    EmptyString,
    ContainsNewline,
    WildcardNotAllowed,
    OutOfBounds,
    NotAnInteger,
    MissingParameter,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::EmptyString => "empty string",
            Self::ContainsNewline => "contains newline",
            Self::WildcardNotAllowed => "wildcard not allowed",
            Self::OutOfBounds => "out of bounds",
            Self::NotAnInteger => "not an integer",
            Self::MissingParameter => "missing parameter",
        };
        f.write_str(text)
    }
}

/// Input rejected by the [`crate::validation::Validator`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("None not allowed{}", field_suffix(.0))]
    NoneNotAllowed(Option<String>),

    #[error("Expected type <{expected}> but got <{found}>{}", field_suffix(.field))]
    WrongType {
        field: Option<String>,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Validation failed ({reason}){}", field_suffix(.field))]
    ValidationFailed {
        field: Option<String>,
        reason: ValidationFailure,
    },
}

fn field_suffix(field: &Option<String>) -> String {
    match field {
        Some(name) => format!(": {name}"),
        None => String::new(),
    }
}

impl ValidationError {
    pub(crate) fn failed(reason: ValidationFailure) -> Self {
        Self::ValidationFailed {
            field: None,
            reason,
        }
    }

    /// Re-tag this error with the name of the field being validated
    ///
    /// # Example
    /// ```
    /// use clauto_common::ValidationError;
    ///
    /// let err = ValidationError::NoneNotAllowed(None).for_field("username");
    /// assert_eq!(err, ValidationError::NoneNotAllowed(Some("username".to_string())));
    /// ```
    pub fn for_field(self, name: impl Into<String>) -> Self {
        let name = Some(name.into());
        match self {
            Self::NoneNotAllowed(_) => Self::NoneNotAllowed(name),
            Self::WrongType {
                expected, found, ..
            } => Self::WrongType {
                field: name,
                expected,
                found,
            },
            Self::ValidationFailed { reason, .. } => Self::ValidationFailed {
                field: name,
                reason,
            },
        }
    }

    /// Field name attached by the caller, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::NoneNotAllowed(field)
            | Self::WrongType { field, .. }
            | Self::ValidationFailed { field, .. } => field.as_deref(),
        }
    }

    pub fn category(&self) -> FailureCategory {
        match self {
            Self::NoneNotAllowed(_) => FailureCategory::NoneValue,
            Self::WrongType { .. } | Self::ValidationFailed { .. } => FailureCategory::Validation,
        }
    }
}
