//! Service configuration
//!
//! Loaded from a TOML file. Every field has a default, so an empty file (or
//! no file at all) yields a working configuration.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::ttl_from_secs;
use crate::data::earthquakes::DEFAULT_EARTHQUAKES_URL;
use crate::data::geomagnetic::DEFAULT_KP_INDEX_URL;
use crate::data::seismic::DEFAULT_SEISMIC_URL;
use crate::data::Region;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Config file is not valid TOML or has wrong field types
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Bind address is not a socket address
    #[error("Invalid bind address: '{0}'")]
    InvalidBind(String),

    /// Lightning bounding box is empty or out of range
    #[error("Invalid lightning region: {0}")]
    InvalidRegion(String),

    /// Upstream timeout must be positive
    #[error("Upstream timeout must be at least one second")]
    InvalidTimeout,

    /// Route TTL does not fit in a cache duration
    #[error("Invalid ttl_secs for route '{route}': {ttl_secs}")]
    InvalidTtl { route: &'static str, ttl_secs: u64 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    #[serde(default)]
    pub lightning: Region,
    #[serde(default)]
    pub gate: GateConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    // listen address, eg: 127.0.0.1:3000
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

/// Settings shared by all upstream requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    // bound on each upstream request, connect included
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_earthquakes_url")]
    pub earthquakes_url: String,

    #[serde(default = "default_seismic_url")]
    pub seismic_url: String,

    #[serde(default = "default_kp_index_url")]
    pub kp_index_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            earthquakes_url: default_earthquakes_url(),
            seismic_url: default_seismic_url(),
            kp_index_url: default_kp_index_url(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("vitalsigns/{}", env!("CARGO_PKG_VERSION"))
}

fn default_earthquakes_url() -> String {
    DEFAULT_EARTHQUAKES_URL.to_string()
}

fn default_seismic_url() -> String {
    DEFAULT_SEISMIC_URL.to_string()
}

fn default_kp_index_url() -> String {
    DEFAULT_KP_INDEX_URL.to_string()
}

/// Cache settings for one route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteConfig {
    // slot time-to-live
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    // Cache-Control hint for the hosting layer, independent of ttl_secs
    #[serde(default)]
    pub revalidate_secs: Option<u64>,
}

impl RouteConfig {
    fn new(ttl_secs: u64, revalidate_secs: Option<u64>) -> Self {
        Self {
            ttl_secs,
            revalidate_secs,
        }
    }
}

fn default_ttl_secs() -> u64 {
    60
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutesConfig {
    #[serde(default = "default_earthquakes_route")]
    pub earthquakes: RouteConfig,
    #[serde(default = "default_geomagnetic_route")]
    pub geomagnetic: RouteConfig,
    #[serde(default = "default_lightning_route")]
    pub lightning: RouteConfig,
    #[serde(default = "default_seismic_route")]
    pub seismic: RouteConfig,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            earthquakes: default_earthquakes_route(),
            geomagnetic: default_geomagnetic_route(),
            lightning: default_lightning_route(),
            seismic: default_seismic_route(),
        }
    }
}

impl RoutesConfig {
    /// Route names paired with their settings
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &RouteConfig)> {
        [
            ("earthquakes", &self.earthquakes),
            ("geomagnetic", &self.geomagnetic),
            ("lightning", &self.lightning),
            ("seismic", &self.seismic),
        ]
        .into_iter()
    }
}

fn default_earthquakes_route() -> RouteConfig {
    RouteConfig::new(60, Some(300))
}

fn default_geomagnetic_route() -> RouteConfig {
    RouteConfig::new(60, None)
}

fn default_lightning_route() -> RouteConfig {
    RouteConfig::new(30, None)
}

fn default_seismic_route() -> RouteConfig {
    RouteConfig::new(60, Some(300))
}

/// Pre-launch password gate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    // gate is disabled when unset
    #[serde(default)]
    pub password: Option<String>,
}

impl Config {
    /// Parses a TOML document and validates it
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that deserialize fine but cannot be used
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.upstream.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        for (route, settings) in self.routes.iter() {
            if ttl_from_secs(settings.ttl_secs).is_none() {
                return Err(ConfigError::InvalidTtl {
                    route,
                    ttl_secs: settings.ttl_secs,
                });
            }
        }
        if !self.lightning.is_valid() {
            return Err(ConfigError::InvalidRegion(format!(
                "lat {}..{}, lon {}..{}",
                self.lightning.min_lat,
                self.lightning.max_lat,
                self.lightning.min_lon,
                self.lightning.max_lon
            )));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind
            .parse()
            .map_err(|_| ConfigError::InvalidBind(self.server.bind.clone()))
    }
}

/// Loads and validates a config file
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Config::parse(&text)
}

/// Platform config file location (`~/.config/vitalsigns/config.toml` on Linux)
///
/// Returns `None` if no home directory can be determined.
pub fn default_path() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "vitalsigns")?;
    Some(project_dirs.config_dir().join("config.toml"))
}
