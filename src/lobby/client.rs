//! Lobby client trait
//!
//! This module defines the interface the controller uses to act on the
//! multiplayer room. The production implementation lives in
//! [`crate::bancho::client`]; tests substitute mocks.

use crate::error::Result;
use crate::types::{TeamMode, WinCondition};
use async_trait::async_trait;

/// Commands the controller can issue against the joined room
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LobbyClient: Send + Sync {
    /// Apply team mode, win condition and slot count
    async fn set_settings(
        &self,
        team_mode: TeamMode,
        win_condition: WinCondition,
        slots: u8,
    ) -> Result<()>;

    /// Set the active mods, optionally letting players pick their own
    async fn set_mods(&self, mods: &str, freemod: bool) -> Result<()>;

    /// Rename the room
    async fn set_name(&self, name: &str) -> Result<()>;

    /// Hand host to `player`
    async fn set_host(&self, player: &str) -> Result<()>;

    /// Abort the match in progress
    async fn abort_match(&self) -> Result<()>;

    /// Say something in the room channel
    async fn send_message(&self, text: &str) -> Result<()>;

    /// Leave the server
    async fn disconnect(&self) -> Result<()>;
}
