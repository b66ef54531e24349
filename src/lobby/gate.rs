//! Star rating band enforcement

use serde::{Deserialize, Serialize};

/// Inclusive star rating band; a bound of `0.0` means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DifficultyGate {
    pub min_stars: f64,
    pub max_stars: f64,
}

impl DifficultyGate {
    pub fn new(min_stars: f64, max_stars: f64) -> Self {
        Self {
            min_stars,
            max_stars,
        }
    }

    pub fn unrestricted() -> Self {
        Self::default()
    }

    fn has_min(&self) -> bool {
        self.min_stars > 0.0
    }

    fn has_max(&self) -> bool {
        self.max_stars > 0.0
    }

    /// Whether any bound is configured
    pub fn is_restricted(&self) -> bool {
        self.has_min() || self.has_max()
    }

    pub fn too_low(&self, rating: f64) -> bool {
        self.has_min() && rating < self.min_stars
    }

    pub fn too_high(&self, rating: f64) -> bool {
        self.has_max() && rating > self.max_stars
    }

    pub fn out_of_band(&self, rating: f64) -> bool {
        self.too_low(rating) || self.too_high(rating)
    }

    /// Band label appended to the lobby name, `None` when unrestricted
    pub fn describe(&self) -> Option<String> {
        match (self.has_min(), self.has_max()) {
            (false, true) => Some(format!("1-{}*", self.max_stars)),
            (true, false) => Some(format!("Min: {}*", self.min_stars)),
            (true, true) => Some(format!("{}-{}*", self.min_stars, self.max_stars)),
            (false, false) => None,
        }
    }
}
