use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Log line importance rank
///
/// The numeric ranks follow the conventional scale (DEBUG=10 … CRITICAL=50) with two extra
/// levels slotted in: VERBOSE just below DEBUG and CONFIG just above ERROR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Verbose,
    Debug,
    Info,
    Warning,
    Error,
    Config,
    Critical,
}

/// Which line layout a severity is written with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatProfile {
    /// `[timestamp][LVL] message`
    User,
    /// `[timestamp][LVL][path:line] message`
    Developer,
}

impl Severity {
    pub const ALL: [Severity; 7] = [
        Severity::Verbose,
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Config,
        Severity::Critical,
    ];

    pub fn rank(self) -> u8 {
        match self {
            Self::Verbose => 9,
            Self::Debug => 10,
            Self::Info => 20,
            Self::Warning => 30,
            Self::Error => 40,
            Self::Config => 41,
            Self::Critical => 50,
        }
    }

    /// Three-letter token written in log lines and accepted by `FromStr`
    pub fn code(self) -> &'static str {
        match self {
            Self::Verbose => "VRB",
            Self::Debug => "DBG",
            Self::Info => "INF",
            Self::Warning => "WRN",
            Self::Error => "ERR",
            Self::Config => "CFG",
            Self::Critical => "CRT",
        }
    }

    pub fn profile(self) -> FormatProfile {
        match self {
            Self::Debug | Self::Verbose => FormatProfile::Developer,
            _ => FormatProfile::User,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown log level <{0}>. Expected one of CRT, CFG, ERR, WRN, INF, DBG, VRB")]
pub struct UnknownSeverity(pub String);

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|severity| severity.code() == s)
            .ok_or_else(|| UnknownSeverity(s.to_string()))
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Self::Verbose,
            tracing::Level::DEBUG => Self::Debug,
            tracing::Level::INFO => Self::Info,
            tracing::Level::WARN => Self::Warning,
            _ => Self::Error,
        }
    }
}
