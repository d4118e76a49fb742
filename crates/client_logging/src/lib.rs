#![deny(missing_docs)]
//! Shared logging utilities for the translate client workspace.
//!
//! This crate provides the `client_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every record is
//! emitted under [`LOG_TARGET`] so the front end can tell client records
//! apart from those of its dependencies.

#[doc(hidden)]
pub use log as __log;

/// Target attached to every record emitted by the `client_*` macros.
pub const LOG_TARGET: &str = "translate_client";

/// Picks the level filter for the given verbosity flag.
///
/// Debug builds always log at debug level.
pub fn level_for(verbose: bool) -> log::LevelFilter {
    if verbose {
        log::LevelFilter::Trace
    } else if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}

/// Logs a trace-level message under the client target.
#[macro_export]
macro_rules! client_trace {
    ($($arg:tt)*) => {{
        $crate::__log::trace!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs a debug-level message under the client target.
#[macro_export]
macro_rules! client_debug {
    ($($arg:tt)*) => {{
        $crate::__log::debug!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs an info-level message under the client target.
#[macro_export]
macro_rules! client_info {
    ($($arg:tt)*) => {{
        $crate::__log::info!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs a warn-level message under the client target.
#[macro_export]
macro_rules! client_warn {
    ($($arg:tt)*) => {{
        $crate::__log::warn!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs an error-level message under the client target.
#[macro_export]
macro_rules! client_error {
    ($($arg:tt)*) => {{
        $crate::__log::error!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level_for(false),
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_enables_trace() {
        assert_eq!(level_for(true), log::LevelFilter::Trace);
    }

    #[test]
    fn macros_expand_without_a_logger() {
        initialize_for_tests();
        client_info!("uploaded {} file(s)", 2);
        client_debug!("sid={}", "abc");
    }
}
