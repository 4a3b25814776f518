// Leveled logging macros
//
// Each expands to the matching Log method with `format_args!`, so the caller's file and
// line are recorded and nothing is formatted below the threshold.

/// Write a line at an explicit [`Severity`](crate::Severity)
#[macro_export]
macro_rules! log_at {
    ($log:expr, $severity:expr, $($arg:tt)+) => {
        $log.log($severity, ::core::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_critical {
    ($log:expr, $($arg:tt)+) => {
        $log.critical(::core::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_config {
    ($log:expr, $($arg:tt)+) => {
        $log.config(::core::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_error {
    ($log:expr, $($arg:tt)+) => {
        $log.error(::core::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_warning {
    ($log:expr, $($arg:tt)+) => {
        $log.warning(::core::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_info {
    ($log:expr, $($arg:tt)+) => {
        $log.info(::core::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_debug {
    ($log:expr, $($arg:tt)+) => {
        $log.debug(::core::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_verbose {
    ($log:expr, $($arg:tt)+) => {
        $log.verbose(::core::format_args!($($arg)+))
    };
}
