//! Message formatting
//!
//! Decorated lines look like
//! `2025-01-08 10:30:45,123 | name | WARNING | message`, in local wall-clock
//! time. `NOTSET` messages are passed through untouched.

use super::log_level::LogLevel;
use super::rank::RankInfo;
use chrono::{DateTime, Local};
use std::borrow::Cow;
use std::fmt::Write;

/// strftime pattern for the timestamp column (`,` then zero-padded millis)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Format `message` at `level` using the current local time
#[must_use]
pub fn format_message<'a>(message: &'a str, level: LogLevel, name: &str) -> Cow<'a, str> {
    if level.is_notset() {
        return Cow::Borrowed(message);
    }
    format_message_at(message, level, name, &Local::now())
}

/// Format `message` at `level` with a fixed timestamp
#[must_use]
pub fn format_message_at<'a>(
    message: &'a str,
    level: LogLevel,
    name: &str,
    now: &DateTime<Local>,
) -> Cow<'a, str> {
    if level.is_notset() {
        return Cow::Borrowed(message);
    }

    let mut line = String::with_capacity(64 + name.len() + message.len());
    // Writing into a String cannot fail
    let _ = write!(line, "{}", now.format(TIMESTAMP_FORMAT));
    line.push_str(" | ");
    line.push_str(name);
    line.push_str(" | ");
    line.push_str(level.to_str());
    line.push_str(" | ");
    line.push_str(message);
    Cow::Owned(line)
}

/// Prepend `[rank/world_size] ` to an already formatted line
#[must_use]
pub fn with_rank_prefix(line: &str, rank: RankInfo) -> String {
    let mut prefixed = String::with_capacity(line.len() + 16);
    let _ = write!(prefixed, "[{}] ", rank);
    prefixed.push_str(line);
    prefixed
}
