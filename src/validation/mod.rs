//! Parameter validation at service boundaries.
//!
//! Every check takes the candidate and its rules explicitly; the [`Validator`] itself only
//! carries a Log handle for diagnostics. Failures are [`ValidationError`]s, which reject one
//! request and never take the process down.
//!
//! ```
//! use clauto_common::validation::{ParamValue, StringRules, Validated, Validator};
//! use clauto_common::StateRegistry;
//!
//! let registry = StateRegistry::new();
//! let validator = Validator::new(&registry)?;
//!
//! let name = validator.validate_string(&ParamValue::from("widgets"), StringRules::new())?;
//! assert_eq!(name, Validated::Value("widgets".to_string()));
//!
//! let rules = StringRules::new().allow_wildcard(true);
//! let any = validator.validate_string(&ParamValue::Wildcard, rules)?;
//! assert!(any.is_wildcard());
//! # Ok::<(), clauto_common::ClautoError>(())
//! ```

pub mod value;

pub use value::{IntRules, ParamValue, StringRules, Validated};

use crate::access_control::{PRIVILEGE_LEVEL_ADMIN, PRIVILEGE_LEVEL_PUBLIC};
use crate::error::{Result, ValidationError, ValidationFailure};
use crate::logging::{DEFAULT_MODULE, Log, Severity};
use crate::state::{SharedState, StateKey, StateRegistry};
use indexmap::IndexMap;
use std::fmt;
use std::panic::Location;

struct ValidatorState {
    log: Log,
}

/// Shared-state handle to the parameter validator
#[derive(Clone, Debug)]
pub struct Validator {
    state: SharedState<ValidatorState>,
}

impl Validator {
    /// Attach to the shared validator, creating it on first use
    ///
    /// The first construction attaches to the registry's Log (initializing it to stdout if
    /// nothing has yet).
    ///
    /// # Errors
    /// Whatever [`Log::new()`] returns on that first construction.
    pub fn new(registry: &StateRegistry) -> Result<Self> {
        let state = registry.acquire(StateKey::VALIDATOR)?;
        state.initialize(|| {
            Ok(ValidatorState {
                log: Log::new(registry, DEFAULT_MODULE, None)?,
            })
        })?;
        Ok(Self { state })
    }

    #[track_caller]
    fn debug(&self, message: fmt::Arguments<'_>) {
        let location = Location::caller();
        self.state.read(|state| state.log.emit(Severity::Debug, message, location.into()));
    }

    #[track_caller]
    fn verbose(&self, message: fmt::Arguments<'_>) {
        let location = Location::caller();
        self.state.read(|state| state.log.emit(Severity::Verbose, message, location.into()));
    }

    /// Check required and optional parameters are present.
    ///
    /// Returns a new map holding every required parameter and every optional one, with
    /// missing optionals filled in as [`ParamValue::Wildcard`]. Parameters named in neither
    /// list are left out of the result; they are not inspected, so this is no security
    /// boundary.
    ///
    /// # Errors
    /// `ValidationFailed` with reason `MissingParameter`, tagged with the parameter name, for
    /// the first missing required parameter.
    pub fn validate_params(
        &self,
        params: &IndexMap<String, ParamValue>,
        required: &[&str],
        optional: &[&str],
    ) -> Result<IndexMap<String, ParamValue>, ValidationError> {
        let mut sanitized = IndexMap::with_capacity(required.len() + optional.len());

        for &name in required {
            let Some(value) = params.get(name) else {
                self.verbose(format_args!("Missing parameter: <{name}>"));
                return Err(
                    ValidationError::failed(ValidationFailure::MissingParameter).for_field(name)
                );
            };
            sanitized.insert(name.to_string(), value.clone());
        }

        for &name in optional {
            let value = match params.get(name) {
                Some(value) => value.clone(),
                None => {
                    self.verbose(format_args!("Filling in param <{name}> with wildcard"));
                    ParamValue::Wildcard
                }
            };
            sanitized.insert(name.to_string(), value);
        }

        Ok(sanitized)
    }

    /// Validate a string candidate.
    ///
    /// Checks run in a fixed order: null, wildcard, type, emptiness, newline. Each later
    /// check relies on the earlier ones having passed.
    pub fn validate_string(
        &self,
        candidate: &ParamValue,
        rules: StringRules,
    ) -> Result<Validated<String>, ValidationError> {
        let text = match candidate {
            ParamValue::Null if rules.allow_null => return Ok(Validated::Null),
            ParamValue::Null => return Err(ValidationError::NoneNotAllowed(None)),
            ParamValue::Wildcard if rules.allow_wildcard => return Ok(Validated::Wildcard),
            ParamValue::Wildcard => {
                return Err(ValidationError::failed(ValidationFailure::WildcardNotAllowed));
            }
            ParamValue::Str(text) => text,
            other => {
                self.debug(format_args!(
                    "Expected type <str> but candidate is of type <{}>",
                    other.type_name()
                ));
                return Err(ValidationError::WrongType {
                    field: None,
                    expected: "str",
                    found: other.type_name(),
                });
            }
        };

        if text.is_empty() && !rules.allow_empty {
            return Err(ValidationError::failed(ValidationFailure::EmptyString));
        }
        if text.contains('\n') && !rules.allow_newline {
            return Err(ValidationError::failed(ValidationFailure::ContainsNewline));
        }

        Ok(Validated::Value(text.clone()))
    }

    /// Validate an integer candidate, given either as an integer or a numeric string.
    ///
    /// A string that doesn't parse is `ValidationFailed`, not `WrongType`. Bounds are
    /// inclusive and only apply when set.
    pub fn validate_int(
        &self,
        candidate: &ParamValue,
        rules: IntRules,
    ) -> Result<Validated<i64>, ValidationError> {
        let value = match candidate {
            ParamValue::Null if rules.allow_null => return Ok(Validated::Null),
            ParamValue::Null => return Err(ValidationError::NoneNotAllowed(None)),
            ParamValue::Wildcard if rules.allow_wildcard => return Ok(Validated::Wildcard),
            ParamValue::Wildcard => {
                return Err(ValidationError::failed(ValidationFailure::WildcardNotAllowed));
            }
            ParamValue::Int(value) => *value,
            ParamValue::Str(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| ValidationError::failed(ValidationFailure::NotAnInteger))?,
            other => {
                self.debug(format_args!(
                    "Expected type <int or str> but candidate is of type <{}>",
                    other.type_name()
                ));
                return Err(ValidationError::WrongType {
                    field: None,
                    expected: "int or str",
                    found: other.type_name(),
                });
            }
        };

        if !rules.contains(value) {
            return Err(ValidationError::failed(ValidationFailure::OutOfBounds));
        }

        Ok(Validated::Value(value))
    }

    /// Validate a username: no empty string, no newline
    ///
    /// Errors are tagged with the field name `username`.
    pub fn validate_username(
        &self,
        candidate: &ParamValue,
        allow_null: bool,
        allow_wildcard: bool,
    ) -> Result<Validated<String>, ValidationError> {
        let username = self
            .validate_string(candidate, credential_rules(allow_null, allow_wildcard))
            .map_err(|e| e.for_field("username"))?;

        self.verbose(format_args!("Validated username <{username}>"));
        Ok(username)
    }

    /// Validate a password: no empty string, no newline
    ///
    /// Errors are tagged with the field name `password`. The value is never logged.
    pub fn validate_password(
        &self,
        candidate: &ParamValue,
        allow_null: bool,
        allow_wildcard: bool,
    ) -> Result<Validated<String>, ValidationError> {
        let password = self
            .validate_string(candidate, credential_rules(allow_null, allow_wildcard))
            .map_err(|e| e.for_field("password"))?;

        self.verbose(format_args!("Validated a password"));
        Ok(password)
    }

    /// Validate a privilege level within [`PRIVILEGE_LEVEL_PUBLIC`, `PRIVILEGE_LEVEL_ADMIN`]
    ///
    /// Errors are tagged with the field name `privilege_level`.
    pub fn validate_privilege_level(
        &self,
        candidate: &ParamValue,
        allow_null: bool,
        allow_wildcard: bool,
    ) -> Result<Validated<i64>, ValidationError> {
        let rules = IntRules::new()
            .allow_null(allow_null)
            .allow_wildcard(allow_wildcard)
            .min(PRIVILEGE_LEVEL_PUBLIC)
            .max(PRIVILEGE_LEVEL_ADMIN);

        let level = self
            .validate_int(candidate, rules)
            .map_err(|e| e.for_field("privilege_level"))?;

        self.verbose(format_args!("Validated privilege level <{level}>"));
        Ok(level)
    }
}

fn credential_rules(allow_null: bool, allow_wildcard: bool) -> StringRules {
    StringRules::new()
        .allow_null(allow_null)
        .allow_wildcard(allow_wildcard)
        .allow_empty(false)
        .allow_newline(false)
}
