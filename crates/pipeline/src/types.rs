use data_loader::Movie;
use serde::{Deserialize, Serialize};

/// One entry of a recommendation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub movie: Movie,
    /// Relevance in `[0, 1]`
    pub score: f32,
    /// Human-readable reasons, strongest first. Never empty.
    pub reasons: Vec<String>,
}

impl RecommendationItem {
    /// Score as a whole percentage, the way clients display it
    pub fn match_percent(&self) -> u8 {
        (self.score.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}
