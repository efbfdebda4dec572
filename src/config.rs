//! Configuration using Figment
//!
//! Configuration is loaded from:
//! 1. `config/torch_morse.toml` (base configuration, optional)
//! 2. Environment variables prefixed `TORCH_MORSE_`, nested with `__`
//!
//! Every field has a default, so a missing file yields a working setup.
//!
//! # Example
//! ```no_run
//! use torch_morse::config::TorchMorseConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // TORCH_MORSE_TIMING__UNIT_MS=120 overrides timing.unit_ms
//! let config = TorchMorseConfig::load()?;
//! config.validate()?;
//! println!("unit: {} ms", config.timing.unit_ms);
//! # Ok(())
//! # }
//! ```

use crate::hardware::{selection::DEFAULT_ROLE_HINTS, sysfs::DEFAULT_LED_ROOT, Resolution};
use crate::morse::{MorseTiming, DEFAULT_UNIT_MS};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/torch_morse.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "TORCH_MORSE_";

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TorchMorseConfig {
    /// Application settings
    pub application: ApplicationConfig,
    /// Default timing
    pub timing: TimingConfig,
    /// Emitter backend settings
    pub emitter: EmitterConfig,
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Application name
    pub name: String,
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: "torch-morse".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Base unit in milliseconds
    pub unit_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            unit_ms: DEFAULT_UNIT_MS,
        }
    }
}

/// Which emitter backend to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-memory backend, no hardware.
    #[default]
    Mock,
    /// Linux LED class devices.
    Sysfs,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Mock => write!(f, "mock"),
            BackendKind::Sysfs => write!(f, "sysfs"),
        }
    }
}

/// Emitter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Backend to use
    pub backend: BackendKind,
    /// Label substrings identifying a rear-facing channel
    pub role_hints: Vec<String>,
    /// Ideal width requested when opening by identifier
    pub ideal_width: u32,
    /// Ideal height requested when opening by identifier
    pub ideal_height: u32,
    /// LED class directory for the sysfs backend
    pub sysfs_root: PathBuf,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            role_hints: DEFAULT_ROLE_HINTS.iter().map(|h| h.to_string()).collect(),
            ideal_width: Resolution::VGA.width,
            ideal_height: Resolution::VGA.height,
            sysfs_root: PathBuf::from(DEFAULT_LED_ROOT),
        }
    }
}

impl EmitterConfig {
    /// Requested resolution.
    pub fn resolution(&self) -> Resolution {
        Resolution {
            width: self.ideal_width,
            height: self.ideal_height,
        }
    }
}

impl TorchMorseConfig {
    /// Load configuration from the default file and environment variables
    ///
    /// Example: `TORCH_MORSE_APPLICATION__LOG_LEVEL=debug`
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific file path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, figment::Error> {
        Self::figment(path.as_ref()).extract()
    }

    /// Provider chain used by [`load_from`](Self::load_from).
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(TorchMorseConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        let level = self.application.log_level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                VALID_LOG_LEVELS.join(", ")
            ));
        }

        if self.timing.unit_ms == 0 {
            return Err("Invalid timing.unit_ms 0. Must be positive".to_string());
        }

        if self.emitter.ideal_width == 0 || self.emitter.ideal_height == 0 {
            return Err(format!(
                "Invalid resolution {}x{}. Both dimensions must be positive",
                self.emitter.ideal_width, self.emitter.ideal_height
            ));
        }

        if self.emitter.role_hints.iter().any(|h| h.trim().is_empty()) {
            return Err("Empty entry in emitter.role_hints".to_string());
        }

        Ok(())
    }

    /// Timing built from `timing.unit_ms`.
    pub fn timing(&self) -> Result<MorseTiming, String> {
        MorseTiming::from_millis(self.timing.unit_ms).map_err(|e| e.to_string())
    }

    /// Render as TOML, e.g. to seed a config file.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
