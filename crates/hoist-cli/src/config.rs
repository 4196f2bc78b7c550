//! Configuration vault – reads/writes `~/.hoist/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use hoist_types::{BuildingConfig, HoistError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the CLI drives the elevator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Hallway calls and destinations are typed at the console.
    #[default]
    Interactive,
    /// Seeded random riders, no prompts and no delays.
    Simulate,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Interactive => write!(f, "interactive"),
            Mode::Simulate => write!(f, "simulate"),
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "interactive" => Ok(Mode::Interactive),
            "simulate" | "sim" => Ok(Mode::Simulate),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write config at {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown mode '{0}', expected 'interactive' or 'simulate'")]
    UnknownMode(String),

    #[error(transparent)]
    Building(#[from] HoistError),
}

/// Persisted settings stored in `~/.hoist/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mode: Mode,

    /// Seed for `simulate` mode.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Rounds of random hallway calls in `simulate` mode.
    #[serde(default = "default_sim_rounds")]
    pub sim_rounds: usize,

    /// Sleep through travel and door times in `interactive` mode.
    #[serde(default = "default_realtime")]
    pub realtime: bool,

    #[serde(default)]
    pub building: BuildingConfig,
}

fn default_seed() -> u64 {
    42
}
fn default_sim_rounds() -> usize {
    5
}
fn default_realtime() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            seed: default_seed(),
            sim_rounds: default_sim_rounds(),
            realtime: default_realtime(),
            building: BuildingConfig::default(),
        }
    }
}

impl Config {
    /// Reject settings the dispatcher cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.building.validate()?;
        Ok(())
    }
}

/// Return the path to `~/.hoist/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".hoist").join("config.toml")
}

/// Load the config from disk and apply `HOIST_*` overrides.  Returns `None`
/// if the file does not exist.
pub fn load() -> Result<Option<Config>, ConfigError> {
    let mut cfg = load_from(&config_path())?;
    if let Some(cfg) = cfg.as_mut() {
        apply_env_overrides(cfg);
    }
    Ok(cfg)
}

pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(toml::from_str(&raw)?))
}

/// Apply `HOIST_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `HOIST_MIN_FLOOR` | `building.min_floor` |
/// | `HOIST_MAX_FLOOR` | `building.max_floor` |
/// | `HOIST_MAX_WEIGHT` | `building.max_weight` |
/// | `HOIST_MODE` | `mode` |
/// | `HOIST_SEED` | `seed` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    apply_overrides(cfg, |key| std::env::var(key).ok());
}

pub(crate) fn apply_overrides(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("HOIST_MIN_FLOOR")
        && let Ok(floor) = v.trim().parse()
    {
        cfg.building.min_floor = floor;
    }
    if let Some(v) = lookup("HOIST_MAX_FLOOR")
        && let Ok(floor) = v.trim().parse()
    {
        cfg.building.max_floor = floor;
    }
    if let Some(v) = lookup("HOIST_MAX_WEIGHT")
        && let Ok(weight) = v.trim().parse()
    {
        cfg.building.max_weight = weight;
    }
    if let Some(v) = lookup("HOIST_MODE")
        && let Ok(mode) = v.parse()
    {
        cfg.mode = mode;
    }
    if let Some(v) = lookup("HOIST_SEED")
        && let Ok(seed) = v.trim().parse()
    {
        cfg.seed = seed;
    }
}

/// Save the config to disk, creating `~/.hoist/` if necessary.
pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
        // Owner only (rwx------) on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700)).map_err(write_err)?;
        }
    }
    let raw = toml::to_string_pretty(cfg)?;
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(write_err)?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw).map_err(write_err)?;
    Ok(())
}
