//! Core logger types and traits

pub mod appender;
pub mod config;
pub mod error;
pub mod formatter;
pub mod log_level;
pub mod logger;
pub mod rank;
pub mod writer;

pub use appender::Appender;
pub use config::{AutoDetectUpdate, FileMode, LoggerConfig, Reconfigure};
pub use error::{LoggerError, Result};
pub use formatter::{format_message, format_message_at, with_rank_prefix, TIMESTAMP_FORMAT};
pub use log_level::LogLevel;
pub use logger::{LogOptions, Logger, LoggerBuilder};
pub use rank::{resolve, AutoDetect, EnvProvider, Launcher, ProcessEnv, RankInfo};
pub use writer::LogWriter;
