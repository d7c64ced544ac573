//! Appender trait for log output destinations

use super::error::Result;

/// A sink receiving fully formatted lines
///
/// Lines are written verbatim; appenders never add separators.
pub trait Appender: Send + Sync {
    fn append(&mut self, line: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
