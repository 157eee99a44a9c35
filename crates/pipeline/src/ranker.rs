//! Final ordering and truncation of recommendation lists.

use crate::types::RecommendationItem;
use sources::{EngineError, Result};
use std::cmp::Ordering;

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct Ranker {
    default_limit: usize,
    max_limit: usize,
}

impl Ranker {
    pub fn new() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }

    /// Build a ranker with custom limits; `1 <= default_limit <= max_limit`
    pub fn with_limits(default_limit: usize, max_limit: usize) -> Result<Self> {
        if default_limit == 0 || default_limit > max_limit {
            return Err(EngineError::invalid_input(format!(
                "default limit {} must be within [1, {}]",
                default_limit, max_limit
            )));
        }
        Ok(Self {
            default_limit,
            max_limit,
        })
    }

    pub fn max_limit(&self) -> usize {
        self.max_limit
    }

    /// Apply the default to a missing limit and reject anything out of range.
    pub fn resolve_limit(&self, limit: Option<usize>) -> Result<usize> {
        let limit = limit.unwrap_or(self.default_limit);
        if limit == 0 || limit > self.max_limit {
            return Err(EngineError::invalid_input(format!(
                "limit {} must be within [1, {}]",
                limit, self.max_limit
            )));
        }
        Ok(limit)
    }

    /// Sort best first and keep the top `limit` items.
    pub fn rank(
        &self,
        mut items: Vec<RecommendationItem>,
        limit: Option<usize>,
    ) -> Result<Vec<RecommendationItem>> {
        let limit = self.resolve_limit(limit)?;
        items.sort_by(compare_items);
        items.truncate(limit);
        Ok(items)
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new()
    }
}

/// Score descending, then vote count descending, then movie id ascending.
///
/// Total over distinct movie ids, so ranking is deterministic.
pub fn compare_items(a: &RecommendationItem, b: &RecommendationItem) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.movie.vote_count.cmp(&a.movie.vote_count))
        .then_with(|| a.movie.id.cmp(&b.movie.id))
}
