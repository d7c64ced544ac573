//! Line-buffered `io::Write` adapter over a [`Logger`]

use super::log_level::LogLevel;
use super::logger::{LogOptions, Logger};
use std::io::{self, Write};

/// Collects written bytes and logs one message per complete line
///
/// Each emitted message keeps its trailing `\n`. A trailing partial line is
/// held back until [`Write::flush`] or drop.
///
/// # Example
///
/// ```
/// use ranklog::prelude::*;
/// use std::io::Write;
///
/// let logger = Logger::new("app").unwrap();
/// let mut out = logger.writer(LogLevel::INFO);
/// writeln!(out, "processed {} items", 42).unwrap();
/// ```
pub struct LogWriter<'a> {
    logger: &'a Logger,
    level: LogLevel,
    options: LogOptions,
    buffer: Vec<u8>,
}

impl<'a> LogWriter<'a> {
    pub(crate) fn new(logger: &'a Logger, level: LogLevel, options: LogOptions) -> Self {
        Self {
            logger,
            level,
            options,
            buffer: Vec::new(),
        }
    }

    fn emit(&self, bytes: &[u8]) {
        self.logger
            .log_with(self.level, String::from_utf8_lossy(bytes), &self.options);
    }

    fn emit_remainder(&mut self) {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            self.emit(&rest);
        }
    }
}

impl Write for LogWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.emit(&line);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit_remainder();
        self.logger.flush().map_err(io::Error::other)
    }
}

impl Drop for LogWriter<'_> {
    fn drop(&mut self) {
        self.emit_remainder();
    }
}
