//! Log level definitions
//!
//! Levels are plain integers so that callers can use severities outside the
//! named table; those compare numerically and render with an empty name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LogLevel(i32);

const LEVEL_NAMES: [(LogLevel, &str); 6] = [
    (LogLevel::NOTSET, "NOTSET"),
    (LogLevel::DEBUG, "DEBUG"),
    (LogLevel::INFO, "INFO"),
    (LogLevel::WARNING, "WARNING"),
    (LogLevel::ERROR, "ERROR"),
    (LogLevel::CRITICAL, "CRITICAL"),
];

impl LogLevel {
    /// Undecorated, print-like output
    pub const NOTSET: LogLevel = LogLevel(0);
    pub const DEBUG: LogLevel = LogLevel(10);
    pub const INFO: LogLevel = LogLevel(20);
    pub const WARNING: LogLevel = LogLevel(30);
    pub const ERROR: LogLevel = LogLevel(40);
    pub const CRITICAL: LogLevel = LogLevel(50);

    #[must_use]
    pub const fn new(value: i32) -> Self {
        LogLevel(value)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }

    /// Name of the level, or `""` for a severity outside the table
    pub fn to_str(&self) -> &'static str {
        LEVEL_NAMES
            .iter()
            .find(|(level, _)| level == self)
            .map(|(_, name)| *name)
            .unwrap_or("")
    }

    #[must_use]
    pub fn is_notset(&self) -> bool {
        *self == LogLevel::NOTSET
    }
}

impl From<i32> for LogLevel {
    fn from(value: i32) -> Self {
        LogLevel(value)
    }
}

impl From<LogLevel> for i32 {
    fn from(level: LogLevel) -> Self {
        level.0
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_str() {
            "" => write!(f, "{}", self.0),
            name => f.write_str(name),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    /// Accepts a level name (case-insensitive, `WARN` and `FATAL` as aliases)
    /// or a raw integer severity.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<i32>() {
            return Ok(LogLevel(value));
        }
        match trimmed.to_uppercase().as_str() {
            "NOTSET" => Ok(LogLevel::NOTSET),
            "DEBUG" => Ok(LogLevel::DEBUG),
            "INFO" => Ok(LogLevel::INFO),
            "WARN" | "WARNING" => Ok(LogLevel::WARNING),
            "ERROR" => Ok(LogLevel::ERROR),
            "CRITICAL" | "FATAL" => Ok(LogLevel::CRITICAL),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}
