//! Collaborator contracts consumed by the recommendation engine.
//!
//! The engine never talks to a database directly. It reads the catalog
//! through [`Catalog`] and a user's history through [`HistoryStore`], so any
//! backing store can be plugged in. [`DataIndex`] implements both.

use crate::error::{StoreError, StoreResult};
use crate::types::{DataIndex, Movie, MovieId, UserId, WatchedEntry};
use std::collections::HashSet;

/// Read-only access to the movie catalog.
pub trait Catalog: Send + Sync {
    /// Look up a single movie; `StoreError::NotFound` if it does not exist
    fn get_movie(&self, id: MovieId) -> StoreResult<Movie>;

    /// List movies not in `exclude_ids`, most popular first.
    ///
    /// When `cap` is set, at most that many movies are returned.
    fn list_candidates(
        &self,
        exclude_ids: &HashSet<MovieId>,
        cap: Option<usize>,
    ) -> StoreResult<Vec<Movie>>;
}

/// Read-only access to per-user history.
pub trait HistoryStore: Send + Sync {
    fn user_exists(&self, user_id: UserId) -> StoreResult<bool>;

    fn get_watched(&self, user_id: UserId) -> StoreResult<Vec<WatchedEntry>>;

    fn get_watchlist_ids(&self, user_id: UserId) -> StoreResult<HashSet<MovieId>>;
}

impl Catalog for DataIndex {
    fn get_movie(&self, id: MovieId) -> StoreResult<Movie> {
        DataIndex::get_movie(self, id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Movie", id))
    }

    fn list_candidates(
        &self,
        exclude_ids: &HashSet<MovieId>,
        cap: Option<usize>,
    ) -> StoreResult<Vec<Movie>> {
        let cap = cap.unwrap_or(usize::MAX);
        Ok(self
            .popularity_order
            .iter()
            .filter(|id| !exclude_ids.contains(id))
            .filter_map(|id| self.movies.get(id))
            .take(cap)
            .cloned()
            .collect())
    }
}

impl HistoryStore for DataIndex {
    fn user_exists(&self, user_id: UserId) -> StoreResult<bool> {
        Ok(self.users.contains_key(&user_id))
    }

    fn get_watched(&self, user_id: UserId) -> StoreResult<Vec<WatchedEntry>> {
        Ok(DataIndex::get_watched(self, user_id).to_vec())
    }

    fn get_watchlist_ids(&self, user_id: UserId) -> StoreResult<HashSet<MovieId>> {
        Ok(self
            .get_watchlist(user_id)
            .iter()
            .map(|entry| entry.movie_id)
            .collect())
    }
}
