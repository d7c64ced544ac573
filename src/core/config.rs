//! Logger configuration
//!
//! [`LoggerConfig`] describes a logger at construction time and
//! [`Reconfigure`] describes a partial update, where every `None` field
//! leaves the current setting alone. Both can be loaded from JSON.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::rank::{AutoDetect, Launcher};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// How the primary log file is opened
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileMode {
    #[default]
    Append,
    Truncate,
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileMode::Append => f.write_str("append"),
            FileMode::Truncate => f.write_str("truncate"),
        }
    }
}

impl FromStr for FileMode {
    type Err = String;

    /// Accepts `append`/`a` and `truncate`/`w`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "a" | "append" => Ok(FileMode::Append),
            "w" | "truncate" => Ok(FileMode::Truncate),
            _ => Err(format!("Invalid file mode: '{}'", s)),
        }
    }
}

/// Complete settings for one logger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Prefixed into every decorated line
    pub name: String,
    /// Primary log file; `None` logs to the console only
    pub file_path: Option<PathBuf>,
    pub mode: FileMode,
    /// Messages below this severity are suppressed
    pub level: LogLevel,
    /// Prefix every message with `[rank/world_size]`
    pub use_rank: bool,
    /// Explicit rank; detected from the environment when unset
    pub rank: Option<u32>,
    /// Explicit world size; detected from the environment when unset
    pub world_size: Option<u32>,
    pub auto_detect_env: AutoDetect,
    /// Only the process with this rank emits output
    pub log_rank: Option<u32>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            file_path: None,
            mode: FileMode::Append,
            level: LogLevel::NOTSET,
            use_rank: false,
            rank: None,
            world_size: None,
            auto_detect_env: AutoDetect::Disabled,
            log_rank: None,
        }
    }
}

impl LoggerConfig {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse a configuration document
    ///
    /// # Example
    ///
    /// ```
    /// use ranklog::{LoggerConfig, LogLevel};
    ///
    /// let config = LoggerConfig::from_json(r#"{"name": "trainer", "level": 20}"#).unwrap();
    /// assert_eq!(config.level, LogLevel::INFO);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        if config.name.is_empty() {
            return Err(LoggerError::config("LoggerConfig", "name must not be empty"));
        }
        Ok(config)
    }

    /// Whether the logger needs a resolved rank
    ///
    /// Rank gating compares against the resolved rank, so a `log_rank`
    /// requires resolution even without the rank prefix.
    #[must_use]
    pub fn needs_rank(&self) -> bool {
        self.use_rank || self.log_rank.is_some()
    }

    /// Apply an update, returning the merged configuration
    #[must_use]
    pub fn merged(&self, update: &Reconfigure) -> Self {
        let mut next = self.clone();
        if let Some(name) = update.name.as_ref().filter(|n| !n.is_empty()) {
            next.name = name.clone();
        }
        if let Some(path) = update.file_path.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            next.file_path = Some(path.clone());
        }
        if let Some(mode) = update.mode {
            next.mode = mode;
        }
        if let Some(level) = update.level {
            next.level = level;
        }
        if let Some(use_rank) = update.use_rank {
            next.use_rank = use_rank;
        }
        if let Some(rank) = update.rank {
            next.rank = Some(rank);
        }
        if let Some(world_size) = update.world_size {
            next.world_size = Some(world_size);
        }
        if let Some(auto_detect_env) = update.auto_detect_env {
            next.auto_detect_env = auto_detect_env;
        }
        if let Some(log_rank) = update.log_rank {
            next.log_rank = Some(log_rank);
        }
        next
    }
}

/// A partial configuration update; `None` means "keep the current value"
///
/// # Example
///
/// ```
/// use ranklog::{LogLevel, Reconfigure};
///
/// let update = Reconfigure::new()
///     .level(LogLevel::DEBUG)
///     .use_rank(true);
/// assert_eq!(update.name, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reconfigure {
    pub name: Option<String>,
    pub file_path: Option<PathBuf>,
    pub mode: Option<FileMode>,
    pub level: Option<LogLevel>,
    pub use_rank: Option<bool>,
    pub rank: Option<u32>,
    pub world_size: Option<u32>,
    /// An empty string in JSON leaves detection unchanged
    #[serde(deserialize_with = "deserialize_auto_detect_update")]
    pub auto_detect_env: Option<AutoDetect>,
    pub log_rank: Option<u32>,
}

fn deserialize_auto_detect_update<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<AutoDetect>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(AutoDetect::parse_update))
}

/// Values accepted by [`Reconfigure::auto_detect_env`]
///
/// Strings go through [`AutoDetect::parse_update`], so `""` is no update.
pub trait AutoDetectUpdate {
    fn into_update(self) -> Option<AutoDetect>;
}

impl AutoDetectUpdate for AutoDetect {
    fn into_update(self) -> Option<AutoDetect> {
        Some(self)
    }
}

impl AutoDetectUpdate for Launcher {
    fn into_update(self) -> Option<AutoDetect> {
        Some(AutoDetect::Launcher(self))
    }
}

impl AutoDetectUpdate for &str {
    fn into_update(self) -> Option<AutoDetect> {
        AutoDetect::parse_update(self)
    }
}

impl AutoDetectUpdate for String {
    fn into_update(self) -> Option<AutoDetect> {
        AutoDetect::parse_update(&self)
    }
}

impl Reconfigure {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn mode(mut self, mode: FileMode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: impl Into<LogLevel>) -> Self {
        self.level = Some(level.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn use_rank(mut self, use_rank: bool) -> Self {
        self.use_rank = Some(use_rank);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn rank(mut self, rank: u32) -> Self {
        self.rank = Some(rank);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn world_size(mut self, world_size: u32) -> Self {
        self.world_size = Some(world_size);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn auto_detect_env(mut self, auto_detect_env: impl AutoDetectUpdate) -> Self {
        self.auto_detect_env = auto_detect_env.into_update();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn log_rank(mut self, log_rank: u32) -> Self {
        self.log_rank = Some(log_rank);
        self
    }

    /// Parse an update document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
