//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. The message is
//! only formatted when the logger would emit it.
//!
//! # Examples
//!
//! ```
//! use ranklog::prelude::*;
//! use ranklog::info;
//!
//! let logger = Logger::new("server").unwrap();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Log a message with automatic formatting, exactly as formatted.
///
/// Unlike the level macros, no newline is appended.
///
/// # Examples
///
/// ```
/// # use ranklog::prelude::*;
/// # let logger = Logger::new("app").unwrap();
/// use ranklog::log;
/// log!(logger, LogLevel::NOTSET, "progress: {}%\n", 40);
/// log!(logger, LogLevel::ERROR, "Error code: {}\n", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let level = $level;
        if $logger.is_enabled(level) {
            $logger.log(level, format!($($arg)+))
        }
    }};
}

/// Log a debug-level line.
///
/// # Examples
///
/// ```
/// # use ranklog::prelude::*;
/// # let logger = Logger::new("app").unwrap();
/// use ranklog::debug;
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        if $logger.is_enabled($crate::LogLevel::DEBUG) {
            $logger.debug(format!($($arg)+))
        }
    };
}

/// Log an info-level line.
///
/// # Examples
///
/// ```
/// # use ranklog::prelude::*;
/// # let logger = Logger::new("app").unwrap();
/// use ranklog::info;
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        if $logger.is_enabled($crate::LogLevel::INFO) {
            $logger.info(format!($($arg)+))
        }
    };
}

/// Log a warning-level line.
///
/// # Examples
///
/// ```
/// # use ranklog::prelude::*;
/// # let logger = Logger::new("app").unwrap();
/// use ranklog::warning;
/// warning!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        if $logger.is_enabled($crate::LogLevel::WARNING) {
            $logger.warning(format!($($arg)+))
        }
    };
}

/// Log an error-level line.
///
/// # Examples
///
/// ```
/// # use ranklog::prelude::*;
/// # let logger = Logger::new("app").unwrap();
/// use ranklog::error;
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        if $logger.is_enabled($crate::LogLevel::ERROR) {
            $logger.error(format!($($arg)+))
        }
    };
}

/// Log a critical-level line.
///
/// # Examples
///
/// ```
/// # use ranklog::prelude::*;
/// # let logger = Logger::new("app").unwrap();
/// use ranklog::critical;
/// critical!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        if $logger.is_enabled($crate::LogLevel::CRITICAL) {
            $logger.critical(format!($($arg)+))
        }
    };
}
