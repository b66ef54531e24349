//! Configuration management for the autohost bot
//!
//! This module handles configuration loading from environment variables and
//! TOML files, validation, and default values, plus the per-run session
//! arguments.

pub mod app;
pub mod lobby;
pub mod session;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, BanchoSettings, ServiceSettings};
pub use lobby::LobbySettings;
pub use session::SessionConfig;
