//! Error types for the autohost bot
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific autohost scenarios
#[derive(Debug, thiserror::Error)]
pub enum AutohostError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Connection to {address} failed: {message}")]
    ConnectionFailed { address: String, message: String },

    #[error("Authentication rejected for {username}: {message}")]
    AuthenticationFailed { username: String, message: String },

    #[error("Protocol error: {message}")]
    Protocol { message: String },

    #[error("Beatmap lookup failed for {beatmap_id}: {reason}")]
    BeatmapLookupFailed { beatmap_id: u64, reason: String },

    #[error("Lobby command '{command}' failed: {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("Client is disconnected")]
    Disconnected,
}

impl AutohostError {
    pub fn config(message: impl Into<String>) -> Self {
        AutohostError::Configuration {
            message: message.into(),
        }
    }
}
