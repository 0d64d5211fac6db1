//! Command-line interface parsing for the vitalsigns server
//!
//! This module handles parsing of CLI arguments using clap and merging them
//! over the config file to produce the configuration the server starts with.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{self, Config, ConfigError};

/// Vital signs data service - cached earth and space data for dashboard widgets
#[derive(Parser, Debug)]
#[command(name = "vitalsigns")]
#[command(about = "Cached earth and space vital signs data over HTTP")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    ///
    /// Defaults to config.toml in the platform config directory
    /// (~/.config/vitalsigns/ on Linux) when that file exists.
    #[arg(long, short, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Address to listen on, overriding the config file (e.g. 0.0.0.0:8080)
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Enable the pre-launch gate with this password
    #[arg(long, env = "VITALSIGNS_GATE_PASSWORD", value_name = "PASSWORD", hide_env_values = true)]
    pub gate_password: Option<String>,
}

impl Cli {
    /// Builds the effective configuration from the config file and CLI overrides.
    ///
    /// # Returns
    /// * `Ok(Config)` with CLI values applied over the file (or defaults)
    /// * `Err(ConfigError)` if an explicit config file is unreadable or any
    ///   resulting value is invalid
    pub fn resolve_config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::load(path)?,
            None => match config::default_path().filter(|p| p.exists()) {
                Some(path) => config::load(&path)?,
                None => Config::default(),
            },
        };

        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(password) = &self.gate_password {
            config.gate.password = Some(password.clone());
        }

        config.validate()?;
        Ok(config)
    }
}
