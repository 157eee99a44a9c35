//! Types passed between the profile and candidate stages.

use data_loader::{Movie, MovieId, WatchedEntry, genre_key};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// A watched entry joined with its catalog movie, if the catalog knows it.
#[derive(Debug, Clone, Copy)]
pub struct HistoryItem<'a> {
    pub entry: &'a WatchedEntry,
    pub movie: Option<&'a Movie>,
}

impl<'a> HistoryItem<'a> {
    pub fn new(entry: &'a WatchedEntry, movie: Option<&'a Movie>) -> Self {
        Self { entry, movie }
    }
}

/// Per-request summary of what a user likes.
///
/// Weights are raw sums of `rating / 10` over the user's history. The
/// `*_affinity` accessors divide by `history_len`, which keeps every
/// affinity in `[0, 1]`: an entry adds at most 1.0 to any key. Keywords are
/// the exception: they are sparse, so theme affinity is measured against the
/// user's strongest keyword instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TasteProfile {
    /// Lower-cased genre -> accumulated weight
    pub genre_weight: BTreeMap<String, f32>,
    /// Lower-cased language code -> accumulated weight
    pub language_weight: BTreeMap<String, f32>,
    /// Decade (1990, 2000, ...) -> accumulated weight
    pub era_weight: BTreeMap<i32, f32>,
    /// Lower-cased keyword -> accumulated weight, strongest keywords only
    pub keyword_weight: BTreeMap<String, f32>,
    /// Movies rated at or above the "liked" threshold
    pub liked_movie_ids: HashSet<MovieId>,
    /// Release decades of the liked movies
    pub liked_decades: BTreeSet<i32>,
    /// Number of history entries that contributed (known movies only)
    pub history_len: usize,
}

impl TasteProfile {
    /// No usable history: ranking falls back to quality alone.
    pub fn is_cold_start(&self) -> bool {
        self.history_len == 0
    }

    pub fn genre_affinity(&self, genre: &str) -> f32 {
        self.normalize(self.genre_weight.get(&genre_key(genre)).copied())
    }

    pub fn language_affinity(&self, language: &str) -> f32 {
        self.normalize(
            self.language_weight
                .get(&language.trim().to_lowercase())
                .copied(),
        )
    }

    pub fn era_affinity(&self, decade: i32) -> f32 {
        self.normalize(self.era_weight.get(&decade).copied())
    }

    /// Keyword weight relative to the strongest kept keyword, in `[0, 1]`
    pub fn theme_affinity(&self, keyword: &str) -> f32 {
        let Some(&weight) = self.keyword_weight.get(&keyword_key(keyword)) else {
            return 0.0;
        };
        let strongest = self.keyword_weight.values().copied().fold(0.0, f32::max);
        if strongest > 0.0 {
            (weight / strongest).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Whether any liked movie was released in this decade
    pub fn liked_era(&self, decade: i32) -> bool {
        self.liked_decades.contains(&decade)
    }

    /// Top `n` genres by weight (ties by name)
    pub fn top_genres(&self, n: usize) -> Vec<(&str, f32)> {
        top_entries(&self.genre_weight, n)
            .into_iter()
            .map(|(genre, weight)| (genre.as_str(), weight))
            .collect()
    }

    /// Top `n` languages by weight (ties by code)
    pub fn top_languages(&self, n: usize) -> Vec<(&str, f32)> {
        top_entries(&self.language_weight, n)
            .into_iter()
            .map(|(lang, weight)| (lang.as_str(), weight))
            .collect()
    }

    /// Top `n` keywords by weight (ties by keyword)
    pub fn top_keywords(&self, n: usize) -> Vec<(&str, f32)> {
        top_entries(&self.keyword_weight, n)
            .into_iter()
            .map(|(keyword, weight)| (keyword.as_str(), weight))
            .collect()
    }

    /// Top `n` decades by weight (ties by decade)
    pub fn top_eras(&self, n: usize) -> Vec<(i32, f32)> {
        top_entries(&self.era_weight, n)
            .into_iter()
            .map(|(decade, weight)| (*decade, weight))
            .collect()
    }

    fn normalize(&self, weight: Option<f32>) -> f32 {
        match weight {
            Some(w) if self.history_len > 0 => (w / self.history_len as f32).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}

/// Normalize a keyword into the key used by profiles
pub fn keyword_key(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

fn top_entries<K: Ord>(map: &BTreeMap<K, f32>, n: usize) -> Vec<(&K, f32)> {
    let mut entries: Vec<(&K, f32)> = map.iter().map(|(k, &w)| (k, w)).collect();
    // BTreeMap iteration is already key-ordered, so a stable sort keeps ties by key
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    entries.truncate(n);
    entries
}

/// Movies eligible for scoring.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    /// Candidates in catalog order (most popular first)
    pub movies: Vec<Movie>,
    /// Size of the watched ∪ watchlist exclusion set
    pub excluded: usize,
    /// True when the candidate cap cut the list short
    pub truncated: bool,
}

impl CandidateSet {
    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}
