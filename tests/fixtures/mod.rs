//! Test fixtures and mock implementations for integration testing

#![allow(dead_code)]

use async_trait::async_trait;
use osu_autohost::error::Result;
use osu_autohost::lobby::LobbyClient;
use osu_autohost::types::{Beatmap, LobbyEvent, TeamMode, WinCondition};
use std::sync::{Arc, Mutex};

/// A command the controller sent to the room
#[derive(Debug, Clone, PartialEq)]
pub enum LobbyCommand {
    Settings(TeamMode, WinCondition, u8),
    Mods(String, bool),
    Name(String),
    Host(String),
    Abort,
    Message(String),
    Disconnect,
}

/// Lobby client that records every command for later assertions
#[derive(Debug, Default)]
pub struct RecordingLobbyClient {
    commands: Arc<Mutex<Vec<LobbyCommand>>>,
}

impl RecordingLobbyClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, command: LobbyCommand) -> Result<()> {
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(command);
        }
        Ok(())
    }

    /// Get all recorded commands
    pub fn commands(&self) -> Vec<LobbyCommand> {
        self.commands
            .lock()
            .map(|commands| commands.clone())
            .unwrap_or_default()
    }

    /// Drain recorded commands
    pub fn take(&self) -> Vec<LobbyCommand> {
        self.commands
            .lock()
            .map(|mut commands| std::mem::take(&mut *commands))
            .unwrap_or_default()
    }

    /// Hosts handed out, in order
    pub fn hosts(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter_map(|command| match command {
                LobbyCommand::Host(player) => Some(player),
                _ => None,
            })
            .collect()
    }

    /// Chat messages sent, in order
    pub fn messages(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter_map(|command| match command {
                LobbyCommand::Message(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn count_aborts(&self) -> usize {
        self.commands()
            .iter()
            .filter(|command| **command == LobbyCommand::Abort)
            .count()
    }
}

#[async_trait]
impl LobbyClient for RecordingLobbyClient {
    async fn set_settings(
        &self,
        team_mode: TeamMode,
        win_condition: WinCondition,
        slots: u8,
    ) -> Result<()> {
        self.record(LobbyCommand::Settings(team_mode, win_condition, slots))
    }

    async fn set_mods(&self, mods: &str, freemod: bool) -> Result<()> {
        self.record(LobbyCommand::Mods(mods.to_string(), freemod))
    }

    async fn set_name(&self, name: &str) -> Result<()> {
        self.record(LobbyCommand::Name(name.to_string()))
    }

    async fn set_host(&self, player: &str) -> Result<()> {
        self.record(LobbyCommand::Host(player.to_string()))
    }

    async fn abort_match(&self) -> Result<()> {
        self.record(LobbyCommand::Abort)
    }

    async fn send_message(&self, text: &str) -> Result<()> {
        self.record(LobbyCommand::Message(text.to_string()))
    }

    async fn disconnect(&self) -> Result<()> {
        self.record(LobbyCommand::Disconnect)
    }
}

pub fn joined(player: &str) -> LobbyEvent {
    LobbyEvent::PlayerJoined {
        player: player.to_string(),
        is_self: false,
    }
}

pub fn self_joined(player: &str) -> LobbyEvent {
    LobbyEvent::PlayerJoined {
        player: player.to_string(),
        is_self: true,
    }
}

pub fn left(player: &str) -> LobbyEvent {
    LobbyEvent::PlayerLeft {
        player: player.to_string(),
    }
}

pub fn finished() -> LobbyEvent {
    LobbyEvent::MatchFinished { scores: Vec::new() }
}

pub fn beatmap_selected(id: u64, rating: f64) -> LobbyEvent {
    LobbyEvent::BeatmapSelected {
        beatmap: Some(Beatmap {
            id,
            title: format!("Test Artist - Test Song [{:.1}*]", rating),
            difficulty_rating: Some(rating),
        }),
    }
}
