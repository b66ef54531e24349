//! osu-autohost - host rotation bot for osu! multiplayer rooms
//!
//! This crate joins a single multiplayer room over Bancho's IRC gateway,
//! rotates host through a queue of players after every match and optionally
//! keeps beatmap picks inside a star rating band.

pub mod bancho;
pub mod config;
pub mod error;
pub mod lobby;
pub mod metrics;
pub mod service;
pub mod types;

// Re-export commonly used types and traits
pub use error::{AutohostError, Result};
pub use types::*;

// Re-export key components
pub use lobby::{DifficultyGate, HostQueue, LobbyClient, LobbyController};
pub use service::AutohostService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
