//! Bancho integration for the autohost bot
//!
//! This module handles the IRC gateway connection, BanchoBot message parsing,
//! beatmap star rating lookups and the [`crate::lobby::LobbyClient`]
//! implementation built on top of them.

pub mod beatmaps;
pub mod client;
pub mod connection;
pub mod events;
pub mod messages;

// Re-export commonly used types
pub use beatmaps::{BeatmapLookup, OsuApiBeatmapLookup, UnratedBeatmapLookup};
pub use client::BanchoClient;
pub use connection::BanchoConnection;
pub use events::EventTranslator;
pub use messages::{IrcMessage, MultiplayerNotice};
