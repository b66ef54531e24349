//! Per-run session configuration
//!
//! Built once from the positional startup arguments `ROOM [MIN_STARS [MAX_STARS]]`
//! and never mutated afterwards.

use crate::error::AutohostError;
use crate::lobby::gate::DifficultyGate;
use crate::types::RoomId;
use serde::{Deserialize, Serialize};

/// Target room and star band for this run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub room_id: RoomId,
    pub min_stars: f64,
    pub max_stars: f64,
    /// Base lobby name; the star band is appended when restricted
    pub lobby_name: String,
}

impl SessionConfig {
    /// Parse the positional arguments, validating each field on its own
    pub fn from_args(
        room: &str,
        min_stars: Option<&str>,
        max_stars: Option<&str>,
        lobby_name: &str,
    ) -> Result<Self, AutohostError> {
        let room_id = parse_room_id(room)?;
        let min_stars = min_stars
            .map(|value| parse_stars("minimum", value))
            .transpose()?
            .unwrap_or(0.0);
        let max_stars = max_stars
            .map(|value| parse_stars("maximum", value))
            .transpose()?
            .unwrap_or(0.0);

        if min_stars > 0.0 && max_stars > 0.0 && max_stars < min_stars {
            return Err(AutohostError::config(format!(
                "maximum stars ({}) must not be below minimum stars ({})",
                max_stars, min_stars
            )));
        }

        if lobby_name.trim().is_empty() {
            return Err(AutohostError::config("lobby name cannot be empty"));
        }

        Ok(Self {
            room_id,
            min_stars,
            max_stars,
            lobby_name: lobby_name.to_string(),
        })
    }

    /// Parse a raw positional list as given on the command line
    pub fn from_positional(args: &[String], lobby_name: &str) -> Result<Self, AutohostError> {
        match args {
            [room] => Self::from_args(room, None, None, lobby_name),
            [room, min] => Self::from_args(room, Some(min), None, lobby_name),
            [room, min, max] => Self::from_args(room, Some(min), Some(max), lobby_name),
            [] => Err(AutohostError::config("missing room id")),
            _ => Err(AutohostError::config(format!(
                "expected at most 3 arguments (room, min stars, max stars), got {}",
                args.len()
            ))),
        }
    }

    pub fn gate(&self) -> DifficultyGate {
        DifficultyGate::new(self.min_stars, self.max_stars)
    }

    /// IRC channel of the multiplayer room
    pub fn channel_name(&self) -> String {
        format!("#mp_{}", self.room_id)
    }

    /// Lobby title including the star band
    pub fn display_name(&self) -> String {
        match self.gate().describe() {
            Some(band) => format!("{} | {}", self.lobby_name, band),
            None => self.lobby_name.clone(),
        }
    }

    pub fn multiplayer_link(&self) -> String {
        format!("https://osu.ppy.sh/mp/{}", self.room_id)
    }
}

fn parse_room_id(room: &str) -> Result<RoomId, AutohostError> {
    let trimmed = room.trim();
    let digits = trimmed
        .strip_prefix("#mp_")
        .or_else(|| trimmed.strip_prefix("mp_"))
        .unwrap_or(trimmed);

    digits
        .parse::<RoomId>()
        .map_err(|_| AutohostError::config(format!("invalid room id: {}", room)))
}

fn parse_stars(which: &str, value: &str) -> Result<f64, AutohostError> {
    let stars: f64 = value
        .trim()
        .parse()
        .map_err(|_| AutohostError::config(format!("invalid {} stars: {}", which, value)))?;

    if !stars.is_finite() || stars < 0.0 {
        return Err(AutohostError::config(format!(
            "{} stars must be a non-negative number, got {}",
            which, value
        )));
    }

    Ok(stars)
}
