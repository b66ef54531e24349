//! Main application configuration
//!
//! This module defines the primary configuration structures for the autohost
//! bot, including environment variable loading, TOML files and validation.

use crate::config::lobby::LobbySettings;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub bancho: BanchoSettings,
    pub lobby: LobbySettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Serve /health and /metrics
    pub enable_health_server: bool,
    /// Port for health check endpoint
    pub health_port: u16,
}

/// Bancho connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BanchoSettings {
    /// IRC gateway host
    pub host: String,
    /// IRC gateway port
    pub port: u16,
    /// osu! username the bot logs in as
    pub username: String,
    /// IRC password from https://osu.ppy.sh/home/account/edit#legacy-api
    pub password: String,
    /// osu! API v1 key used for star rating lookups
    pub api_key: String,
    /// Base URL of the osu! web API
    pub api_base_url: String,
    /// Connection and login timeout in seconds
    pub connect_timeout_seconds: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "osu-autohost".to_string(),
            log_level: "info".to_string(),
            enable_health_server: false,
            health_port: 8080,
        }
    }
}

impl Default for BanchoSettings {
    fn default() -> Self {
        Self {
            host: "irc.ppy.sh".to_string(),
            port: 6667,
            username: String::new(),
            password: String::new(),
            api_key: String::new(),
            api_base_url: "https://osu.ppy.sh/api".to_string(),
            connect_timeout_seconds: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let mut config = Self::from_toml_str(&contents)?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parse a TOML document; missing fields fall back to defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse TOML configuration")
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }
        if let Ok(enable) = env::var("ENABLE_HEALTH_SERVER") {
            self.service.enable_health_server = enable
                .parse()
                .map_err(|_| anyhow!("Invalid ENABLE_HEALTH_SERVER value: {}", enable))?;
        }
        if let Ok(port) = env::var("HEALTH_PORT") {
            self.service.health_port = port
                .parse()
                .map_err(|_| anyhow!("Invalid HEALTH_PORT value: {}", port))?;
        }

        // Bancho settings
        if let Ok(user) = env::var("OSU_USER") {
            self.bancho.username = user;
        }
        if let Ok(pass) = env::var("OSU_PASS") {
            self.bancho.password = pass;
        }
        if let Ok(key) = env::var("API_KEY") {
            self.bancho.api_key = key;
        }
        if let Ok(host) = env::var("IRC_HOST") {
            self.bancho.host = host;
        }
        if let Ok(port) = env::var("IRC_PORT") {
            self.bancho.port = port
                .parse()
                .map_err(|_| anyhow!("Invalid IRC_PORT value: {}", port))?;
        }

        // Lobby settings
        if let Ok(name) = env::var("LOBBY_NAME") {
            self.lobby.name = name;
        }

        Ok(())
    }

    /// Get connect timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.bancho.connect_timeout_seconds)
    }

    /// Address of the IRC gateway
    pub fn irc_address(&self) -> String {
        format!("{}:{}", self.bancho.host, self.bancho.port)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate ports
    if config.service.enable_health_server && config.service.health_port == 0 {
        return Err(anyhow!("Health port cannot be 0"));
    }
    if config.bancho.port == 0 {
        return Err(anyhow!("IRC port cannot be 0"));
    }

    // Validate credentials
    if config.bancho.username.is_empty() {
        return Err(anyhow!("osu! username is not set (OSU_USER)"));
    }
    if config.bancho.password.is_empty() {
        return Err(anyhow!("IRC password is not set (OSU_PASS)"));
    }
    if config.bancho.host.is_empty() {
        return Err(anyhow!("IRC host cannot be empty"));
    }
    if config.bancho.connect_timeout_seconds == 0 {
        return Err(anyhow!("Connect timeout must be greater than 0"));
    }

    // Validate lobby settings
    if config.lobby.name.trim().is_empty() {
        return Err(anyhow!("Lobby name cannot be empty"));
    }
    if !(1..=16).contains(&config.lobby.slots) {
        return Err(anyhow!(
            "Lobby slots must be between 1 and 16, got {}",
            config.lobby.slots
        ));
    }

    Ok(())
}
