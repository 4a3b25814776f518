// Clauto Common - shared infrastructure for Clauto services
//
// Each service process builds a Log first, then its Config, then a Validator for its
// service boundary. All three are shared-state singletons: construct them wherever they are
// needed and every instance sees the same underlying state.

mod macros;

pub mod access_control;
pub mod config;
pub mod error;
pub mod exitcodes;
pub mod logging;
pub mod state;
pub mod validation;

// Re-export commonly used types for convenience
pub use config::{Config, ConfigMapping};
pub use error::{ClautoError, Result, ValidationError, ValidationFailure};
pub use exitcodes::{ExitCode, FailureCategory};
pub use logging::{Log, LogTarget, Severity};
pub use state::{SharedState, StateKey, StateRegistry};
pub use validation::{ParamValue, Validated, Validator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
