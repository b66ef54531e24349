//! Common types used throughout the autohost bot

use serde::{Deserialize, Serialize};

/// Player identifier as shown in the lobby (the osu! username)
pub type PlayerName = String;

/// Numeric multiplayer room identifier
pub type RoomId = u64;

/// Team mode applied through `!mp set`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamMode {
    HeadToHead,
    TagCoop,
    TeamVs,
    TagTeamVs,
}

impl TeamMode {
    /// Numeric code understood by BanchoBot
    pub fn code(self) -> u8 {
        match self {
            TeamMode::HeadToHead => 0,
            TeamMode::TagCoop => 1,
            TeamMode::TeamVs => 2,
            TeamMode::TagTeamVs => 3,
        }
    }
}

/// Win condition applied through `!mp set`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WinCondition {
    Score,
    Accuracy,
    Combo,
    ScoreV2,
}

impl WinCondition {
    /// Numeric code understood by BanchoBot
    pub fn code(self) -> u8 {
        match self {
            WinCondition::Score => 0,
            WinCondition::Accuracy => 1,
            WinCondition::Combo => 2,
            WinCondition::ScoreV2 => 3,
        }
    }
}

/// Selected beatmap as reported by the protocol client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beatmap {
    pub id: u64,
    pub title: String,
    /// Star rating, `None` when the lookup failed or returned garbage
    pub difficulty_rating: Option<f64>,
}

impl Beatmap {
    /// Star rating if it can be evaluated against a band
    pub fn rating(&self) -> Option<f64> {
        self.difficulty_rating.filter(|rating| rating.is_finite())
    }
}

/// A single player's result, as far as the chat protocol reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub player: PlayerName,
    pub score: u64,
    pub passed: bool,
}

/// Events delivered by the protocol client to the lobby controller
#[derive(Debug, Clone, PartialEq)]
pub enum LobbyEvent {
    /// A player took a slot in the room
    PlayerJoined { player: PlayerName, is_self: bool },
    /// A player left the room
    PlayerLeft { player: PlayerName },
    /// The running match ended normally
    MatchFinished { scores: Vec<PlayerScore> },
    /// The host picked a beatmap; `None` when the map could not be identified
    BeatmapSelected { beatmap: Option<Beatmap> },
    /// The host started the match
    MatchStarted,
    /// Host moved to `player`, by us or by someone else
    HostChanged { player: PlayerName },
    /// The room was closed
    MatchClosed,
    /// Transport level failure reported by the client
    TransportError { message: String },
}

impl LobbyEvent {
    /// Short tag for logs and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            LobbyEvent::PlayerJoined { .. } => "player_joined",
            LobbyEvent::PlayerLeft { .. } => "player_left",
            LobbyEvent::MatchFinished { .. } => "match_finished",
            LobbyEvent::BeatmapSelected { .. } => "beatmap_selected",
            LobbyEvent::MatchStarted => "match_started",
            LobbyEvent::HostChanged { .. } => "host_changed",
            LobbyEvent::MatchClosed => "match_closed",
            LobbyEvent::TransportError { .. } => "transport_error",
        }
    }
}

/// Point-in-time view of the rotation state, published after every event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LobbySnapshot {
    pub current_host: Option<PlayerName>,
    pub upcoming_hosts: Vec<PlayerName>,
    pub already_hosted: Vec<PlayerName>,
    pub current_beatmap: Option<Beatmap>,
    pub events_handled: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_codes() {
        assert_eq!(TeamMode::HeadToHead.code(), 0);
        assert_eq!(TeamMode::TagTeamVs.code(), 3);
        assert_eq!(WinCondition::Score.code(), 0);
        assert_eq!(WinCondition::ScoreV2.code(), 3);
    }

    #[test]
    fn test_beatmap_rating_filters_non_finite() {
        let mut beatmap = Beatmap {
            id: 1,
            title: "test".to_string(),
            difficulty_rating: Some(4.2),
        };
        assert_eq!(beatmap.rating(), Some(4.2));

        beatmap.difficulty_rating = Some(f64::NAN);
        assert_eq!(beatmap.rating(), None);

        beatmap.difficulty_rating = None;
        assert_eq!(beatmap.rating(), None);
    }

    #[test]
    fn test_event_kind() {
        assert_eq!(LobbyEvent::MatchStarted.kind(), "match_started");
        assert_eq!(
            LobbyEvent::PlayerLeft {
                player: "a".to_string()
            }
            .kind(),
            "player_left"
        );
    }
}
