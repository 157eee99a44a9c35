//! Core domain types for the movie catalog and user history.
//!
//! This module defines the fundamental data structures used throughout the system:
//! - Type aliases for domain clarity (UserId, MovieId)
//! - Catalog entities (Movie) and users (User)
//! - History relations (WatchedEntry, WatchlistEntry)
//! - DataIndex, the in-memory store that backs the collaborator traits

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a movie (catalog id)
pub type MovieId = u32;

/// Highest rating a user can give a movie
pub const MAX_RATING: u8 = 10;

/// Lowest rating a user can give a movie
pub const MIN_RATING: u8 = 1;

// =============================================================================
// User
// =============================================================================

/// A registered user. The engine only cares that the user exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

// =============================================================================
// Movie
// =============================================================================

/// A catalog movie. Read-only from the engine's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Genres split from the comma-delimited catalog field, trimmed and deduplicated
    pub genres: Vec<String>,
    /// ISO 639-1 code such as "en" or "fr"
    pub original_language: Option<String>,
    /// Release date as stored by the catalog ("YYYY-MM-DD")
    pub release_date: Option<String>,
    pub vote_average: f32,
    pub vote_count: u32,
    pub popularity: f32,
    pub revenue: u64,
    pub budget: u64,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub keywords: Option<String>,
    pub overview: Option<String>,
}

impl Movie {
    /// Create a movie with only an id and a title; everything else is empty.
    ///
    /// Mostly useful for tests and fixtures, combined with struct update syntax.
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            genres: Vec::new(),
            original_language: None,
            release_date: None,
            vote_average: 0.0,
            vote_count: 0,
            popularity: 0.0,
            revenue: 0,
            budget: 0,
            poster_path: None,
            backdrop_path: None,
            keywords: None,
            overview: None,
        }
    }

    /// Release year taken from the first four characters of `release_date`
    ///
    /// Example: "1994-09-23" -> Some(1994), "" or "unknown" -> None
    pub fn release_year(&self) -> Option<i32> {
        let date = self.release_date.as_deref()?.trim();
        let year = date.get(..4)?;
        if !year.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        year.parse().ok()
    }

    /// Decade bucket of the release year: `floor(year / 10) * 10`
    pub fn decade(&self) -> Option<i32> {
        self.release_year().map(decade_of)
    }

    /// Keywords split from the comma-delimited catalog field
    pub fn keyword_list(&self) -> Vec<String> {
        self.keywords.as_deref().map(split_list).unwrap_or_default()
    }

    /// Lower-cased language code, if the movie has one
    pub fn language_key(&self) -> Option<String> {
        self.original_language
            .as_deref()
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .map(str::to_lowercase)
    }
}

/// Decade bucket for a year
pub fn decade_of(year: i32) -> i32 {
    year.div_euclid(10) * 10
}

/// Normalize a genre name into the key used by profiles and indices
pub fn genre_key(genre: &str) -> String {
    genre.trim().to_lowercase()
}

/// Split a delimited genre field into a clean list.
///
/// Example: "Drama, Crime,,drama" -> ["Drama", "Crime"]
pub fn split_genres(field: &str) -> Vec<String> {
    split_list(field)
}

/// Split any comma-delimited catalog field, trimming and dropping
/// case-insensitive duplicates.
pub fn split_list(field: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    field
        .split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .filter(|g| seen.insert(genre_key(g)))
        .map(str::to_string)
        .collect()
}

// =============================================================================
// History relations
// =============================================================================

/// A movie the user has marked as watched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedEntry {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Rating from 1 to 10, if the user gave one
    pub rating: Option<u8>,
    pub notes: Option<String>,
    pub watched_date: Option<String>,
}

impl WatchedEntry {
    pub fn new(user_id: UserId, movie_id: MovieId, rating: Option<u8>) -> Self {
        Self {
            user_id,
            movie_id,
            rating,
            notes: None,
            watched_date: None,
        }
    }
}

/// A movie the user intends to watch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub added_at: Option<String>,
}

// =============================================================================
// DataIndex - The In-Memory Store
// =============================================================================

/// Holds the catalog and every user's history, with the lookups the
/// engine needs.
///
/// `DataIndex` is the reference implementation of both collaborator traits
/// ([`crate::Catalog`] and [`crate::HistoryStore`]). It is built once and then
/// shared read-only behind an `Arc`.
#[derive(Debug, Default)]
pub struct DataIndex {
    pub(crate) users: HashMap<UserId, User>,
    pub(crate) movies: HashMap<MovieId, Movie>,

    /// Watched entries per user, at most one per movie
    pub(crate) watched: HashMap<UserId, Vec<WatchedEntry>>,
    /// Watchlist entries per user, at most one per movie
    pub(crate) watchlist: HashMap<UserId, Vec<WatchlistEntry>>,

    /// All movie ids, most popular first (ties by id)
    pub(crate) popularity_order: Vec<MovieId>,
}

impl DataIndex {
    /// Creates a new, empty DataIndex
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.get(&id)
    }

    /// All watched entries of a user (empty slice if none)
    pub fn get_watched(&self, user_id: UserId) -> &[WatchedEntry] {
        self.watched
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All watchlist entries of a user (empty slice if none)
    pub fn get_watchlist(&self, user_id: UserId) -> &[WatchlistEntry] {
        self.watchlist
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Movie ids ordered by popularity, most popular first.
    ///
    /// Only meaningful after [`DataIndex::build_popularity_order`] has run.
    pub fn popularity_order(&self) -> &[MovieId] {
        &self.popularity_order
    }

    /// All user ids, sorted
    pub fn user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.users.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    pub fn insert_movie(&mut self, movie: Movie) {
        self.movies.insert(movie.id, movie);
    }

    /// Insert a watched entry, replacing any previous entry for the same movie
    pub fn insert_watched(&mut self, entry: WatchedEntry) {
        let entries = self.watched.entry(entry.user_id).or_default();
        match entries.iter_mut().find(|e| e.movie_id == entry.movie_id) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
    }

    /// Insert a watchlist entry; adding the same movie twice is a no-op
    pub fn insert_watchlist(&mut self, entry: WatchlistEntry) {
        let entries = self.watchlist.entry(entry.user_id).or_default();
        if !entries.iter().any(|e| e.movie_id == entry.movie_id) {
            entries.push(entry);
        }
    }

    /// Get counts for debugging/validation: (users, movies, watched, watchlist)
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        let watched = self.watched.values().map(|v| v.len()).sum();
        let watchlist = self.watchlist.values().map(|v| v.len()).sum();
        (self.users.len(), self.movies.len(), watched, watchlist)
    }
}
