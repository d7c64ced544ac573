//! Rank and world-size resolution for distributed runs
//!
//! Explicit values always win. Otherwise the environment variables of known
//! launchers (MPI, torchrun, Horovod, Slurm, NCCL) are probed through an
//! [`EnvProvider`], falling back to rank 0 of a world of 1.

use super::error::{LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Source of environment variables
///
/// The process environment is the default; tests and embedders can supply a
/// synthetic one instead of mutating the real environment.
pub trait EnvProvider: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvProvider for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvProvider for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// A distributed launcher whose environment encodes rank and world size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Launcher {
    Mpirun,
    Torchrun,
    Horovod,
    Slurm,
    Nccl,
    General,
}

impl Launcher {
    pub const ALL: [Launcher; 6] = [
        Launcher::Mpirun,
        Launcher::Torchrun,
        Launcher::Horovod,
        Launcher::Slurm,
        Launcher::Nccl,
        Launcher::General,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            Launcher::Mpirun => "mpirun",
            Launcher::Torchrun => "torchrun",
            Launcher::Horovod => "horovod",
            Launcher::Slurm => "slurm",
            Launcher::Nccl => "nccl",
            Launcher::General => "general",
        }
    }

    /// `(rank variable, world size variable)`
    pub fn env_vars(&self) -> (&'static str, &'static str) {
        match self {
            Launcher::Mpirun => ("OMPI_COMM_WORLD_RANK", "OMPI_COMM_WORLD_SIZE"),
            Launcher::Torchrun | Launcher::General => ("RANK", "WORLD_SIZE"),
            Launcher::Horovod => ("HOROVOD_RANK", "HOROVOD_SIZE"),
            Launcher::Slurm => ("SLURM_PROCID", "SLURM_NTASKS"),
            Launcher::Nccl => ("NCCL_RANK", "NCCL_WORLD_SIZE"),
        }
    }
}

impl fmt::Display for Launcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for Launcher {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Launcher::ALL
            .into_iter()
            .find(|launcher| launcher.to_str() == s)
            .ok_or_else(|| format!("Unknown launcher: '{}'", s))
    }
}

/// Which launcher environments to consult when explicit values are missing
///
/// Parsing never fails: `"all"` and `""` probe every launcher, a known
/// launcher name probes only that one, and anything else (including
/// `"none"`) disables detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AutoDetect {
    All,
    Launcher(Launcher),
    #[default]
    Disabled,
}

impl From<&str> for AutoDetect {
    fn from(s: &str) -> Self {
        match s {
            "" | "all" => AutoDetect::All,
            other => other
                .parse::<Launcher>()
                .map(AutoDetect::Launcher)
                .unwrap_or(AutoDetect::Disabled),
        }
    }
}

impl AutoDetect {
    /// Parse a setting for a partial update, where `""` means "unchanged"
    #[must_use]
    pub fn parse_update(s: &str) -> Option<AutoDetect> {
        if s.is_empty() {
            None
        } else {
            Some(AutoDetect::from(s))
        }
    }
}

impl From<String> for AutoDetect {
    fn from(s: String) -> Self {
        AutoDetect::from(s.as_str())
    }
}

impl From<Launcher> for AutoDetect {
    fn from(launcher: Launcher) -> Self {
        AutoDetect::Launcher(launcher)
    }
}

impl From<AutoDetect> for String {
    fn from(auto: AutoDetect) -> Self {
        auto.to_string()
    }
}

impl fmt::Display for AutoDetect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutoDetect::All => f.write_str("all"),
            AutoDetect::Launcher(launcher) => f.write_str(launcher.to_str()),
            AutoDetect::Disabled => f.write_str("none"),
        }
    }
}

/// A resolved position in a distributed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankInfo {
    pub rank: u32,
    pub world_size: u32,
}

impl RankInfo {
    pub const DEFAULT: RankInfo = RankInfo {
        rank: 0,
        world_size: 1,
    };

    #[must_use]
    pub const fn new(rank: u32, world_size: u32) -> Self {
        Self { rank, world_size }
    }

    /// Fill missing values with the defaults
    #[must_use]
    pub fn from_partial(rank: Option<u32>, world_size: Option<u32>) -> Self {
        Self {
            rank: rank.unwrap_or(Self::DEFAULT.rank),
            world_size: world_size.unwrap_or(Self::DEFAULT.world_size),
        }
    }

    fn validated(self) -> Result<Self> {
        if self.world_size == 0 {
            return Err(LoggerError::config(
                "RankResolver",
                "world_size must be at least 1",
            ));
        }
        Ok(self)
    }
}

impl Default for RankInfo {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for RankInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.rank, self.world_size)
    }
}

/// Resolve the effective rank and world size
///
/// # Errors
///
/// Returns [`LoggerError::MalformedRankEnv`] when a matched launcher variable
/// is not an unsigned integer, and [`LoggerError::InvalidConfiguration`] for a
/// world size of zero.
pub fn resolve(
    rank: Option<u32>,
    world_size: Option<u32>,
    auto_detect: AutoDetect,
    env: &dyn EnvProvider,
) -> Result<RankInfo> {
    if let (Some(rank), Some(world_size)) = (rank, world_size) {
        return RankInfo::new(rank, world_size).validated();
    }

    let detected = match auto_detect {
        AutoDetect::All => {
            let mut found = None;
            for launcher in Launcher::ALL {
                if let Some(info) = detect(launcher, env)? {
                    found = Some(info);
                    break;
                }
            }
            found
        }
        AutoDetect::Launcher(launcher) => detect(launcher, env)?,
        AutoDetect::Disabled => None,
    };

    detected
        .unwrap_or_else(|| RankInfo::from_partial(rank, world_size))
        .validated()
}

/// Probe one launcher; `None` unless both of its variables are set
fn detect(launcher: Launcher, env: &dyn EnvProvider) -> Result<Option<RankInfo>> {
    let (rank_var, size_var) = launcher.env_vars();
    let (Some(rank), Some(world_size)) = (env.var(rank_var), env.var(size_var)) else {
        return Ok(None);
    };

    Ok(Some(RankInfo::new(
        parse_env_int(rank_var, &rank)?,
        parse_env_int(size_var, &world_size)?,
    )))
}

fn parse_env_int(var: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|e| LoggerError::malformed_rank_env(var, value, e))
}
