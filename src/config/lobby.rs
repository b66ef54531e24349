//! Room settings applied once after joining

use crate::types::{TeamMode, WinCondition};
use serde::{Deserialize, Serialize};

/// Settings pushed to the room at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LobbySettings {
    /// Base lobby name
    pub name: String,
    pub team_mode: TeamMode,
    pub win_condition: WinCondition,
    /// Number of open player slots
    pub slots: u8,
    /// Mods applied to the room
    pub mods: String,
    /// Let players pick their own mods
    pub freemod: bool,
}

impl Default for LobbySettings {
    fn default() -> Self {
        Self {
            name: "osu-autohost-bot".to_string(),
            team_mode: TeamMode::HeadToHead,
            win_condition: WinCondition::Score,
            slots: 8,
            mods: "Freemod".to_string(),
            freemod: true,
        }
    }
}
