//! Star rating lookups against the osu! web API (v1)

use crate::error::{AutohostError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Resolves the star rating of a beatmap
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BeatmapLookup: Send + Sync {
    /// `Ok(None)` when the beatmap is unknown or has no rating
    async fn star_rating(&self, beatmap_id: u64) -> Result<Option<f64>>;
}

/// Entry of the `get_beatmaps` response; the API sends numbers as strings
#[derive(Debug, Deserialize)]
struct ApiBeatmap {
    difficultyrating: Option<String>,
}

/// Lookup backed by `GET /api/get_beatmaps`
pub struct OsuApiBeatmapLookup {
    http: Client,
    base_url: String,
    api_key: String,
}

impl OsuApiBeatmapLookup {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("osu-autohost/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl BeatmapLookup for OsuApiBeatmapLookup {
    async fn star_rating(&self, beatmap_id: u64) -> Result<Option<f64>> {
        let url = format!("{}/get_beatmaps", self.base_url);
        let beatmap = beatmap_id.to_string();

        let response = self
            .http
            .get(&url)
            .query(&[("k", self.api_key.as_str()), ("b", beatmap.as_str())])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| AutohostError::BeatmapLookupFailed {
                beatmap_id,
                reason: e.to_string(),
            })?;

        let beatmaps: Vec<ApiBeatmap> =
            response
                .json()
                .await
                .map_err(|e| AutohostError::BeatmapLookupFailed {
                    beatmap_id,
                    reason: e.to_string(),
                })?;

        let rating = parse_rating(&beatmaps);
        debug!("Beatmap {} rated {:?}", beatmap_id, rating);
        Ok(rating)
    }
}

fn parse_rating(beatmaps: &[ApiBeatmap]) -> Option<f64> {
    beatmaps
        .first()?
        .difficultyrating
        .as_deref()?
        .parse::<f64>()
        .ok()
        .filter(|rating| rating.is_finite())
}

/// Used when no API key is configured: every beatmap is unrated
#[derive(Debug, Default, Clone)]
pub struct UnratedBeatmapLookup;

#[async_trait]
impl BeatmapLookup for UnratedBeatmapLookup {
    async fn star_rating(&self, _beatmap_id: u64) -> Result<Option<f64>> {
        Ok(None)
    }
}
