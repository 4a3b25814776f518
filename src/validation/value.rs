use std::fmt;

/// A parameter value as it arrives at a service boundary
///
/// `Null` means the caller passed nothing; `Wildcard` means the caller explicitly doesn't
/// care (any value is acceptable downstream). The two are never interchangeable.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Wildcard,
    Str(String),
    Int(i64),
    Bool(bool),
    Float(f64),
}

impl ParamValue {
    /// Name of the value's type, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Wildcard => "wildcard",
            Self::Str(_) => "str",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::Float(_) => "float",
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Outcome of a successful validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validated<T> {
    /// Null was passed and allowed
    Null,
    /// The wildcard was passed and allowed
    Wildcard,
    Value(T),
}

impl<T> Validated<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Validated<U> {
        match self {
            Self::Null => Validated::Null,
            Self::Wildcard => Validated::Wildcard,
            Self::Value(value) => Validated::Value(f(value)),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Validated<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("None"),
            Self::Wildcard => f.write_str("*"),
            Self::Value(value) => value.fmt(f),
        }
    }
}

/// Per-call permissiveness for string validation
///
/// Defaults: null rejected, wildcard rejected, empty rejected, newlines allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringRules {
    pub allow_null: bool,
    pub allow_wildcard: bool,
    pub allow_empty: bool,
    pub allow_newline: bool,
}

impl Default for StringRules {
    fn default() -> Self {
        Self {
            allow_null: false,
            allow_wildcard: false,
            allow_empty: false,
            allow_newline: true,
        }
    }
}

impl StringRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_null(mut self, allow: bool) -> Self {
        self.allow_null = allow;
        self
    }

    pub fn allow_wildcard(mut self, allow: bool) -> Self {
        self.allow_wildcard = allow;
        self
    }

    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    pub fn allow_newline(mut self, allow: bool) -> Self {
        self.allow_newline = allow;
        self
    }
}

/// Per-call permissiveness and bounds for integer validation
///
/// A bound of `Some(0)` is a real bound; `None` means unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntRules {
    pub allow_null: bool,
    pub allow_wildcard: bool,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl IntRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_null(mut self, allow: bool) -> Self {
        self.allow_null = allow;
        self
    }

    pub fn allow_wildcard(mut self, allow: bool) -> Self {
        self.allow_wildcard = allow;
        self
    }

    /// Inclusive lower bound
    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    /// Inclusive upper bound
    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}
