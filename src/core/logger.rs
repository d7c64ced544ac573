//! Main logger implementation

use super::{
    appender::Appender,
    config::{FileMode, LoggerConfig, Reconfigure},
    error::Result,
    formatter::{format_message, with_rank_prefix},
    log_level::LogLevel,
    rank::{self, AutoDetect, EnvProvider, ProcessEnv, RankInfo},
    writer::LogWriter,
};
use crate::appenders::{ConsoleAppender, FileAppender};
use parking_lot::Mutex;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Per-call dispatch options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// Prefix this message with `[rank/world_size]`
    pub use_rank: bool,
    /// Write this message to another file instead of the primary one
    pub new_file: Option<PathBuf>,
}

impl LogOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_rank(mut self) -> Self {
        self.use_rank = true;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn new_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.new_file = Some(path.into());
        self
    }
}

struct LoggerState {
    config: LoggerConfig,
    rank: RankInfo,
    console: Box<dyn Appender>,
    /// Open iff `config.file_path` is set and opening it succeeded
    file: Option<FileAppender>,
}

impl LoggerState {
    fn should_emit(&self, level: LogLevel) -> bool {
        if let Some(log_rank) = self.config.log_rank {
            if self.rank.rank != log_rank {
                return false;
            }
        }
        level >= self.config.level
    }

    fn dispatch(&mut self, line: &str, new_file: Option<&Path>) {
        if let Err(e) = self.console.append(line) {
            eprintln!(
                "[LOGGER ERROR] Appender '{}' failed: {}",
                self.console.name(),
                e
            );
        }

        match new_file.filter(|path| !path.as_os_str().is_empty()) {
            Some(path) => {
                if let Err(e) = FileAppender::append_once(path, line) {
                    eprintln!("[LOGGER ERROR] Failed to write to new file: {}", e);
                }
            }
            None => {
                if let Some(file) = self.file.as_mut() {
                    if let Err(e) = file.append(line) {
                        eprintln!(
                            "[LOGGER ERROR] Failed to write to '{}': {}",
                            file.path().display(),
                            e
                        );
                    }
                }
            }
        }
    }
}

/// A leveled logger writing to the console and optionally to files
///
/// All state sits behind one mutex, so a `Logger` can be shared across
/// threads and every call writes whole lines.
///
/// # Example
///
/// ```no_run
/// use ranklog::prelude::*;
///
/// let logger = Logger::builder("trainer")
///     .file("logs/train.log")
///     .level(LogLevel::INFO)
///     .use_rank(true)
///     .auto_detect_env(AutoDetect::All)
///     .build()?;
///
/// logger.info("epoch 1 done");
/// logger.log(LogLevel::NOTSET, "raw progress output\n");
/// # Ok::<(), ranklog::LoggerError>(())
/// ```
pub struct Logger {
    state: Mutex<LoggerState>,
    env: Box<dyn EnvProvider>,
}

impl Logger {
    /// Console-only logger at `NOTSET` level
    ///
    /// # Errors
    ///
    /// Never fails for a default configuration; see [`Logger::from_config`].
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Self::builder(name).build()
    }

    /// Build a logger from a complete configuration
    ///
    /// # Errors
    ///
    /// Returns an error when rank resolution fails. A file that cannot be
    /// opened is reported on stderr and the logger stays console-only.
    pub fn from_config(config: LoggerConfig) -> Result<Self> {
        LoggerBuilder::from_config(config).build()
    }

    #[must_use]
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder::new(name)
    }

    fn resolve_rank(config: &LoggerConfig, env: &dyn EnvProvider) -> Result<RankInfo> {
        let auto_detect = if config.needs_rank() {
            config.auto_detect_env
        } else {
            AutoDetect::Disabled
        };
        rank::resolve(config.rank, config.world_size, auto_detect, env)
    }

    fn open_primary(path: &Path, mode: FileMode) -> Option<FileAppender> {
        match FileAppender::open(path, mode) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("[LOGGER ERROR] Failed to open file: {}", e);
                None
            }
        }
    }

    /// Log `message` at `level`, exactly as given
    ///
    /// No newline is appended.
    pub fn log(&self, level: impl Into<LogLevel>, message: impl AsRef<str>) {
        self.log_with(level, message, &LogOptions::default());
    }

    /// Log with per-call rank display or an ad hoc target file
    pub fn log_with(
        &self,
        level: impl Into<LogLevel>,
        message: impl AsRef<str>,
        options: &LogOptions,
    ) {
        let level = level.into();
        let mut state = self.state.lock();
        if !state.should_emit(level) {
            return;
        }

        let formatted = format_message(message.as_ref(), level, &state.config.name);
        let line = if !level.is_notset() && (options.use_rank || state.config.use_rank) {
            Cow::Owned(with_rank_prefix(&formatted, state.rank))
        } else {
            formatted
        };

        state.dispatch(&line, options.new_file.as_deref());
    }

    /// Whether a message at `level` would currently produce output
    pub fn is_enabled(&self, level: impl Into<LogLevel>) -> bool {
        self.state.lock().should_emit(level.into())
    }

    fn log_line(&self, level: LogLevel, message: &str, options: &LogOptions) {
        if !self.is_enabled(level) {
            return;
        }
        let mut line = String::with_capacity(message.len() + 1);
        line.push_str(message);
        line.push('\n');
        self.log_with(level, line, options);
    }

    #[inline]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log_line(LogLevel::DEBUG, message.as_ref(), &LogOptions::default());
    }

    #[inline]
    pub fn info(&self, message: impl AsRef<str>) {
        self.log_line(LogLevel::INFO, message.as_ref(), &LogOptions::default());
    }

    #[inline]
    pub fn warning(&self, message: impl AsRef<str>) {
        self.log_line(LogLevel::WARNING, message.as_ref(), &LogOptions::default());
    }

    #[inline]
    pub fn error(&self, message: impl AsRef<str>) {
        self.log_line(LogLevel::ERROR, message.as_ref(), &LogOptions::default());
    }

    #[inline]
    pub fn critical(&self, message: impl AsRef<str>) {
        self.log_line(LogLevel::CRITICAL, message.as_ref(), &LogOptions::default());
    }

    /// [`Logger::debug`] with per-call rank display or an ad hoc target file
    #[inline]
    pub fn debug_with(&self, message: impl AsRef<str>, options: &LogOptions) {
        self.log_line(LogLevel::DEBUG, message.as_ref(), options);
    }

    #[inline]
    pub fn info_with(&self, message: impl AsRef<str>, options: &LogOptions) {
        self.log_line(LogLevel::INFO, message.as_ref(), options);
    }

    #[inline]
    pub fn warning_with(&self, message: impl AsRef<str>, options: &LogOptions) {
        self.log_line(LogLevel::WARNING, message.as_ref(), options);
    }

    #[inline]
    pub fn error_with(&self, message: impl AsRef<str>, options: &LogOptions) {
        self.log_line(LogLevel::ERROR, message.as_ref(), options);
    }

    #[inline]
    pub fn critical_with(&self, message: impl AsRef<str>, options: &LogOptions) {
        self.log_line(LogLevel::CRITICAL, message.as_ref(), options);
    }

    /// A line-buffered [`std::io::Write`] adapter logging at `level`
    pub fn writer(&self, level: impl Into<LogLevel>) -> LogWriter<'_> {
        LogWriter::new(self, level.into(), LogOptions::default())
    }

    /// Like [`Logger::writer`] with per-line dispatch options
    pub fn writer_with(&self, level: impl Into<LogLevel>, options: LogOptions) -> LogWriter<'_> {
        LogWriter::new(self, level.into(), options)
    }

    /// Push buffered output of the primary file and the console
    pub fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(file) = state.file.as_mut() {
            file.flush()?;
        }
        state.console.flush()
    }

    /// Flush and release the primary file
    ///
    /// The primary path is forgotten, so reconfiguring with the same path
    /// later opens it again. Subsequent messages go to the console only.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.config.file_path = None;
        match state.file.take() {
            Some(mut file) => file.flush(),
            None => Ok(()),
        }
    }

    /// Apply a partial configuration update atomically
    ///
    /// Rank and world size are re-resolved from the configured explicit
    /// values, which persist across updates until replaced. The primary file
    /// is only reopened when its path actually changes.
    ///
    /// # Errors
    ///
    /// Returns an error when rank resolution fails; the logger is then left
    /// unchanged.
    pub fn reconfigure(&self, update: Reconfigure) -> Result<()> {
        let mut state = self.state.lock();
        let next = state.config.merged(&update);
        let rank = Self::resolve_rank(&next, self.env.as_ref())?;

        if next.file_path != state.config.file_path {
            // Release the old handle before the new one is opened
            state.file = None;
            state.file = next
                .file_path
                .as_deref()
                .and_then(|path| Self::open_primary(path, next.mode));
        }

        state.config = next;
        state.rank = rank;
        Ok(())
    }

    pub fn name(&self) -> String {
        self.state.lock().config.name.clone()
    }

    pub fn level(&self) -> LogLevel {
        self.state.lock().config.level
    }

    pub fn rank_info(&self) -> RankInfo {
        self.state.lock().rank
    }

    pub fn file_path(&self) -> Option<PathBuf> {
        self.state.lock().config.file_path.clone()
    }

    pub fn is_file_open(&self) -> bool {
        self.state.lock().file.is_some()
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> LoggerConfig {
        self.state.lock().config.clone()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use ranklog::prelude::*;
/// use std::collections::HashMap;
///
/// let env: HashMap<String, String> = [
///     ("OMPI_COMM_WORLD_RANK".to_string(), "8".to_string()),
///     ("OMPI_COMM_WORLD_SIZE".to_string(), "34".to_string()),
/// ]
/// .into_iter()
/// .collect();
///
/// let logger = Logger::builder("worker")
///     .level(LogLevel::INFO)
///     .use_rank(true)
///     .auto_detect_env(Launcher::Mpirun)
///     .env(env)
///     .build()
///     .unwrap();
///
/// assert_eq!(logger.rank_info(), RankInfo::new(8, 34));
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    console: Option<Box<dyn Appender>>,
    env: Option<Box<dyn EnvProvider>>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_config(LoggerConfig::new(name))
    }

    pub fn from_config(config: LoggerConfig) -> Self {
        Self {
            config,
            console: None,
            env: None,
        }
    }

    /// Primary log file; parent directories are created on open
    #[must_use = "builder methods return a new value"]
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.file_path = Some(path.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn mode(mut self, mode: FileMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: impl Into<LogLevel>) -> Self {
        self.config.level = level.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn use_rank(mut self, use_rank: bool) -> Self {
        self.config.use_rank = use_rank;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn rank(mut self, rank: u32) -> Self {
        self.config.rank = Some(rank);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn world_size(mut self, world_size: u32) -> Self {
        self.config.world_size = Some(world_size);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn auto_detect_env(mut self, auto_detect: impl Into<AutoDetect>) -> Self {
        self.config.auto_detect_env = auto_detect.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn log_rank(mut self, log_rank: u32) -> Self {
        self.config.log_rank = Some(log_rank);
        self
    }

    /// Replace the console sink (stdout by default)
    #[must_use = "builder methods return a new value"]
    pub fn console<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.console = Some(Box::new(appender));
        self
    }

    /// Replace the environment used for rank detection
    #[must_use = "builder methods return a new value"]
    pub fn env<E: EnvProvider + 'static>(mut self, env: E) -> Self {
        self.env = Some(Box::new(env));
        self
    }

    /// Build the Logger
    ///
    /// # Errors
    ///
    /// Returns an error when rank resolution fails.
    pub fn build(self) -> Result<Logger> {
        let mut config = self.config;
        config.file_path = config
            .file_path
            .filter(|path| !path.as_os_str().is_empty());

        let env = self.env.unwrap_or_else(|| Box::new(ProcessEnv));
        let rank = Logger::resolve_rank(&config, env.as_ref())?;
        let file = config
            .file_path
            .as_deref()
            .and_then(|path| Logger::open_primary(path, config.mode));

        Ok(Logger {
            state: Mutex::new(LoggerState {
                config,
                rank,
                console: self
                    .console
                    .unwrap_or_else(|| Box::new(ConsoleAppender::new())),
                file,
            }),
            env,
        })
    }
}
