//! # ranklog
//!
//! A minimal, high-throughput leveled logger for single- and multi-process
//! programs.
//!
//! ## Features
//!
//! - **Leveled text lines**: `2025-01-08 10:30:45,123 | name | INFO | message`
//! - **Console and file sinks**, plus per-message ad hoc files
//! - **Rank annotation**: `[rank/world_size]` prefixes, detected from MPI,
//!   torchrun, Horovod, Slurm or NCCL environments
//! - **Rank gating**: emit only on one chosen rank
//! - **Thread safe**: one logger can be shared across threads

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, FileAppender};
    pub use crate::core::{
        Appender, AutoDetect, EnvProvider, FileMode, Launcher, LogLevel, LogOptions, LogWriter,
        Logger, LoggerBuilder, LoggerConfig, LoggerError, ProcessEnv, RankInfo, Reconfigure,
        Result,
    };
}

pub use crate::appenders::{ConsoleAppender, FileAppender};
pub use crate::core::{
    Appender, AutoDetect, AutoDetectUpdate, EnvProvider, FileMode, Launcher, LogLevel, LogOptions,
    LogWriter, Logger, LoggerBuilder, LoggerConfig, LoggerError, ProcessEnv, RankInfo, Reconfigure,
    Result,
};
