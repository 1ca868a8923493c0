//! Runtime configuration
//!
//! The defaults in `graphyte.toml` are compiled in. An override document is
//! merged over them key by key, so it only needs the keys it changes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use graphyte_drivers::BusTiming;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Compiled-in defaults
pub const DEFAULT_CONFIG: &str = include_str!("../graphyte.toml");

/// Environment variable naming an override file
pub const CONFIG_ENV: &str = "GRAPHYTE_CONFIG";

/// Override file used when nothing else is given
pub const SYSTEM_CONFIG: &str = "/etc/graphyte.toml";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid TOML in {origin}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// GPIO wiring of the LCD bus
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GpioConfig {
    /// sysfs GPIO class directory
    pub sysfs_root: PathBuf,
    /// Added to every pin number
    pub base: u32,
    /// Register select
    pub rs: u32,
    /// Enable strobe
    pub enable: u32,
    /// D4, D5, D6, D7
    pub data: [u32; 4],
}

/// Bus and frame timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TimingConfig {
    pub enable_pulse_ns: u32,
    pub enable_settle_ns: u32,
    pub clear_settle_ns: u32,
    /// Time between interlace frames
    pub interlace_ms: u64,
}

impl TimingConfig {
    /// Bus timing for the HD44780 driver
    pub fn bus(&self) -> BusTiming {
        BusTiming {
            enable_pulse_ns: self.enable_pulse_ns,
            enable_settle_ns: self.enable_settle_ns,
            clear_settle_ns: self.clear_settle_ns,
        }
    }

    /// Interlace interval in nanoseconds
    pub fn interval_ns(&self) -> u64 {
        self.interlace_ms.saturating_mul(1_000_000)
    }
}

/// Shared glyph store
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Shared-memory name, with its leading slash
    pub name: String,
    /// Zero the store when the driver starts
    pub clear_on_start: bool,
}

/// Driver process control
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DriverConfig {
    /// Program started by the editor
    pub program: PathBuf,
    /// File holding the running driver's PID
    pub pid_file: PathBuf,
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub gpio: GpioConfig,
    pub timing: TimingConfig,
    pub store: StoreConfig,
    pub driver: DriverConfig,
}

impl Config {
    /// The compiled-in configuration
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::from_table(parse_table(DEFAULT_CONFIG, "built-in defaults")?)
    }

    /// Defaults with `overrides` merged over them
    pub fn from_overrides(overrides: &str, origin: &str) -> Result<Self, ConfigError> {
        let mut table = parse_table(DEFAULT_CONFIG, "built-in defaults")?;
        merge(&mut table, parse_table(overrides, origin)?);
        Self::from_table(table)
    }

    /// Load with the usual precedence
    ///
    /// `path` if given, else `$GRAPHYTE_CONFIG`, else `/etc/graphyte.toml`
    /// if it exists, else the defaults alone.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => std::env::var_os(CONFIG_ENV)
                .map(PathBuf::from)
                .or_else(|| {
                    let system = PathBuf::from(SYSTEM_CONFIG);
                    system.exists().then_some(system)
                }),
        };

        match path {
            Some(path) => Self::load_file(&path),
            None => {
                debug!("no override file, using built-in configuration");
                Self::defaults()
            }
        }
    }

    /// Defaults with the file at `path` merged over them
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loading configuration");
        Self::from_overrides(&content, &path.display().to_string())
    }

    fn from_table(table: toml::Table) -> Result<Self, ConfigError> {
        let config: Config =
            toml::Value::Table(table)
                .try_into()
                .map_err(|source| ConfigError::Parse {
                    origin: "merged configuration".into(),
                    source,
                })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.interlace_ms == 0 {
            return Err(ConfigError::Invalid(
                "timing.interlace_ms must be positive".into(),
            ));
        }
        if !self.store.name.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "store.name '{}' must start with '/'",
                self.store.name
            )));
        }

        let mut pins = vec![self.gpio.rs, self.gpio.enable];
        pins.extend(self.gpio.data);
        pins.sort_unstable();
        if pins.windows(2).any(|w| w[0] == w[1]) {
            return Err(ConfigError::Invalid(
                "gpio pins must all be different".into(),
            ));
        }
        Ok(())
    }
}

fn parse_table(source: &str, origin: &str) -> Result<toml::Table, ConfigError> {
    toml::from_str(source).map_err(|source| ConfigError::Parse {
        origin: origin.into(),
        source,
    })
}

/// Recursively overlay `overrides` onto `base`
fn merge(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(inner)), toml::Value::Table(value)) => merge(inner, value),
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
