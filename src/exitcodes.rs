// Exit codes and the failure categories that select them
//
// The surrounding process supervisor reads these codes, so their values are fixed.

use crate::error::{ClautoError, ValidationError};

/// Process exit codes understood by the Clauto supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExitCode {
    /// Everything is alright
    Ok = 0,
    /// Something went wrong and the process doesn't know what it is
    Error = 1,
    /// The OS did something unexpected
    OsError = 2,
    LogFileUnwritable = 3,
    ConfigFileUnreadable = 4,
    ConfigSettingMissing = 5,
}

impl ExitCode {
    /// Code under the shared-library convention (non-negative)
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Code under the daemon convention, where failures are negative
    ///
    /// The daemon only distinguishes generic, OS and log-file failures; the config codes
    /// collapse into the generic one.
    pub fn daemon_code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::OsError => -2,
            Self::LogFileUnwritable => -3,
            Self::Error | Self::ConfigFileUnreadable | Self::ConfigSettingMissing => -1,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        // All codes are in 0..=5
        std::process::ExitCode::from(code.code() as u8)
    }
}

/// Closed set of semantic reasons a process can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCategory {
    LogFileUnwritable,
    AlreadyInstantiated,
    EmptyConfigInstantiation,
    ConfigFileUnreadable,
    ConfigKeyMissing,
    NoneValue,
    Validation,
    DatabaseState,
    MissingSubject,
    InvalidCredentials,
    Os,
    Unknown,
}

/// Code used for anything without a specific mapping
pub const DEFAULT_EXIT_CODE: ExitCode = ExitCode::Error;

impl FailureCategory {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::LogFileUnwritable => ExitCode::LogFileUnwritable,
            Self::ConfigFileUnreadable => ExitCode::ConfigFileUnreadable,
            Self::ConfigKeyMissing => ExitCode::ConfigSettingMissing,
            Self::Os => ExitCode::OsError,
            Self::AlreadyInstantiated
            | Self::EmptyConfigInstantiation
            | Self::NoneValue
            | Self::Validation
            | Self::DatabaseState
            | Self::MissingSubject
            | Self::InvalidCredentials
            | Self::Unknown => DEFAULT_EXIT_CODE,
        }
    }
}

/// Pick the exit code for an application-level error.
///
/// Walks the `anyhow` chain and uses the first Clauto error found. Raw I/O errors map to
/// [`ExitCode::OsError`]; anything else gets [`DEFAULT_EXIT_CODE`].
///
/// # Example
/// ```
/// use clauto_common::ClautoError;
/// use clauto_common::exitcodes::{exit_code_for, ExitCode};
///
/// let err = anyhow::Error::new(ClautoError::ConfigKeyMissing("db_path".into()))
///     .context("loading daemon settings");
/// assert_eq!(exit_code_for(&err), ExitCode::ConfigSettingMissing);
/// ```
pub fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    for cause in error.chain() {
        if let Some(err) = cause.downcast_ref::<ClautoError>() {
            return err.exit_code();
        }
        if let Some(err) = cause.downcast_ref::<ValidationError>() {
            return err.category().exit_code();
        }
        if cause.downcast_ref::<std::io::Error>().is_some() {
            return FailureCategory::Os.exit_code();
        }
    }
    DEFAULT_EXIT_CODE
}
