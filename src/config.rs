//! Application-level configuration loading: reaper timing, polling hint,
//! listening port and the static identity table.

use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::services::reaper::{DEFAULT_PRESENCE_TIMEOUT, DEFAULT_REAP_INTERVAL, ReaperConfig};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "WILDGUESS_CONFIG_PATH";

const REAP_INTERVAL_ENV: &str = "REAP_INTERVAL_MS";
const PRESENCE_TIMEOUT_ENV: &str = "PRESENCE_TIMEOUT_MS";
const POLLING_RATE_ENV: &str = "POLLING_RATE_MS";
const PORT_ENV: &str = "PORT";
const SERVER_PORT_ENV: &str = "SERVER_PORT";

const DEFAULT_POLLING_RATE: Duration = Duration::from_millis(2_000);
const DEFAULT_PORT: u16 = 8080;

/// Configuration problems that must stop the process before it serves anything.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable holds something other than the expected number.
    #[error("invalid value `{value}` for {var}: expected a non-negative integer in range")]
    InvalidNumber {
        /// Offending variable.
        var: &'static str,
        /// Raw value found in the environment.
        value: String,
    },
    /// A duration that must be positive was configured as zero.
    #[error("{name} must be greater than zero")]
    ZeroDuration {
        /// Name of the setting.
        name: &'static str,
    },
    /// The reaper would sweep less often than members time out.
    #[error(
        "reap interval ({interval:?}) must be shorter than the presence timeout ({timeout:?})"
    )]
    UnsafeReapTiming {
        /// Configured sweep interval.
        interval: Duration,
        /// Configured inactivity timeout.
        timeout: Duration,
    },
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    identities: IndexMap<String, String>,
    reaper: ReaperConfig,
    polling_rate: Duration,
    port: u16,
}

impl AppConfig {
    /// Load the configuration file (falling back to defaults when it is
    /// missing or malformed) and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let raw = read_config_file(&resolve_config_path());
        Self::from_sources(raw, |key| env::var(key).ok())
    }

    /// Combine a parsed file with an environment lookup. Environment values win.
    pub fn from_sources<F>(raw: RawConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let interval = parse_number::<u64, _>(&lookup, REAP_INTERVAL_ENV)?
            .or(raw.reap_interval_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_REAP_INTERVAL);
        let timeout = parse_number::<u64, _>(&lookup, PRESENCE_TIMEOUT_ENV)?
            .or(raw.presence_timeout_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_PRESENCE_TIMEOUT);
        let polling_rate = parse_number::<u64, _>(&lookup, POLLING_RATE_ENV)?
            .or(raw.polling_rate_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLLING_RATE);

        if polling_rate.is_zero() {
            return Err(ConfigError::ZeroDuration {
                name: POLLING_RATE_ENV,
            });
        }

        let port = match parse_number::<u16, _>(&lookup, PORT_ENV)? {
            Some(port) => port,
            None => parse_number::<u16, _>(&lookup, SERVER_PORT_ENV)?.unwrap_or(DEFAULT_PORT),
        };

        Ok(Self {
            identities: raw.identities,
            reaper: ReaperConfig::new(interval, timeout)?,
            polling_rate,
            port,
        })
    }

    /// Static credential → member table for the token directory.
    pub fn identities(&self) -> &IndexMap<String, String> {
        &self.identities
    }

    /// Timing of the membership reaper.
    pub fn reaper(&self) -> ReaperConfig {
        self.reaper
    }

    /// Interval clients are told to poll at.
    pub fn polling_rate(&self) -> Duration {
        self.polling_rate
    }

    /// TCP port the HTTP server binds to.
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            identities: IndexMap::new(),
            reaper: ReaperConfig::default(),
            polling_rate: DEFAULT_POLLING_RATE,
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
pub struct RawConfig {
    #[serde(default)]
    identities: IndexMap<String, String>,
    reap_interval_ms: Option<u64>,
    presence_timeout_ms: Option<u64>,
    polling_rate_ms: Option<u64>,
}

fn parse_number<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
    }
}

fn read_config_file(path: &Path) -> RawConfig {
    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
            Ok(raw) => {
                info!(
                    path = %path.display(),
                    identities = raw.identities.len(),
                    "loaded configuration file"
                );
                raw
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to parse config; falling back to defaults"
                );
                RawConfig::default()
            }
        },
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(
                path = %path.display(),
                "config file not found; using built-in defaults"
            );
            RawConfig::default()
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "failed to read config; falling back to defaults"
            );
            RawConfig::default()
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
