//! Translation of BanchoBot notices into lobby events

use crate::bancho::beatmaps::BeatmapLookup;
use crate::bancho::messages::{normalize_username, MultiplayerNotice};
use crate::types::{Beatmap, LobbyEvent, PlayerScore};
use std::sync::Arc;
use tracing::{debug, warn};

/// Stateful notice translator; collects scores between start and finish
pub struct EventTranslator {
    own_name: String,
    lookup: Arc<dyn BeatmapLookup>,
    scores: Vec<PlayerScore>,
}

impl EventTranslator {
    pub fn new(own_name: &str, lookup: Arc<dyn BeatmapLookup>) -> Self {
        Self {
            own_name: normalize_username(own_name),
            lookup,
            scores: Vec::new(),
        }
    }

    /// Turn a notice into an event; some notices only update internal state
    pub async fn translate(&mut self, notice: MultiplayerNotice) -> Option<LobbyEvent> {
        match notice {
            MultiplayerNotice::PlayerJoined { player, slot } => {
                debug!("{} took slot {}", player, slot);
                let is_self = normalize_username(&player) == self.own_name;
                Some(LobbyEvent::PlayerJoined { player, is_self })
            }
            MultiplayerNotice::PlayerLeft { player } => Some(LobbyEvent::PlayerLeft { player }),
            MultiplayerNotice::HostChanged { player } => Some(LobbyEvent::HostChanged { player }),
            MultiplayerNotice::BeatmapChanged { beatmap_id, title } => {
                let difficulty_rating = match self.lookup.star_rating(beatmap_id).await {
                    Ok(rating) => rating,
                    Err(e) => {
                        warn!("Could not look up beatmap {}: {}", beatmap_id, e);
                        None
                    }
                };

                Some(LobbyEvent::BeatmapSelected {
                    beatmap: Some(Beatmap {
                        id: beatmap_id,
                        title,
                        difficulty_rating,
                    }),
                })
            }
            MultiplayerNotice::MatchStarted => {
                self.scores.clear();
                Some(LobbyEvent::MatchStarted)
            }
            MultiplayerNotice::PlayerFinished(score) => {
                self.scores.push(score);
                None
            }
            MultiplayerNotice::MatchFinished => Some(LobbyEvent::MatchFinished {
                scores: std::mem::take(&mut self.scores),
            }),
            MultiplayerNotice::MatchClosed => Some(LobbyEvent::MatchClosed),
        }
    }
}
