//! Build a TasteProfile from a user's watched history.
//!
//! Every watched entry with a known movie adds `rating / 10` (or the neutral
//! rating when unrated) to:
//! - each of the movie's genres
//! - the movie's original language
//! - the movie's release decade
//! - each of the movie's keywords
//!
//! Only the strongest keywords are kept. Ratings at or above the liked
//! threshold also mark the movie, and its decade, as liked.
//! The profile is rebuilt for every request; nothing here is cached.

use crate::error::{EngineError, Result};
use crate::types::{HistoryItem, TasteProfile, keyword_key};
use data_loader::{MAX_RATING, MIN_RATING, genre_key};
use tracing::{debug, instrument};

/// Rating assumed for watched-but-unrated movies (midpoint of 1..=10)
pub const DEFAULT_NEUTRAL_RATING: f32 = 5.5;

/// Ratings at or above this count as "liked"
pub const DEFAULT_LIKED_THRESHOLD: u8 = 7;

/// Keywords kept per profile
pub const PROFILE_KEYWORDS: usize = 20;

/// Turns watched history into a TasteProfile.
#[derive(Debug, Clone)]
pub struct ProfileBuilder {
    neutral_rating: f32,
    liked_threshold: u8,
}

impl ProfileBuilder {
    pub fn new() -> Self {
        Self {
            neutral_rating: DEFAULT_NEUTRAL_RATING,
            liked_threshold: DEFAULT_LIKED_THRESHOLD,
        }
    }

    /// Configure the rating used for unrated entries (default: 5.5)
    pub fn with_neutral_rating(mut self, rating: f32) -> Self {
        self.neutral_rating = rating;
        self
    }

    /// Configure the liked threshold (default: 7)
    pub fn with_liked_threshold(mut self, threshold: u8) -> Self {
        self.liked_threshold = threshold;
        self
    }

    /// Accumulate the profile.
    ///
    /// Fails with `InvalidInput` if any entry carries a rating outside
    /// `[1, 10]`, or if the builder itself is misconfigured. Entries whose
    /// movie is unknown are skipped.
    #[instrument(skip_all, fields(entries = history.len()))]
    pub fn build(&self, history: &[HistoryItem<'_>]) -> Result<TasteProfile> {
        self.validate()?;

        for item in history {
            if let Some(rating) = item.entry.rating
                && !(MIN_RATING..=MAX_RATING).contains(&rating)
            {
                return Err(EngineError::invalid_input(format!(
                    "rating {} for movie {} is outside [{}, {}]",
                    rating, item.entry.movie_id, MIN_RATING, MAX_RATING
                )));
            }
        }

        let mut profile = TasteProfile::default();
        let mut skipped = 0usize;

        for item in history {
            let Some(movie) = item.movie else {
                skipped += 1;
                continue;
            };

            let rating = item
                .entry
                .rating
                .map(f32::from)
                .unwrap_or(self.neutral_rating);
            let weight = rating / f32::from(MAX_RATING);

            for genre in &movie.genres {
                *profile.genre_weight.entry(genre_key(genre)).or_insert(0.0) += weight;
            }

            if let Some(language) = movie.language_key() {
                *profile.language_weight.entry(language).or_insert(0.0) += weight;
            }

            if let Some(decade) = movie.decade() {
                *profile.era_weight.entry(decade).or_insert(0.0) += weight;
            }

            for keyword in movie.keyword_list() {
                *profile.keyword_weight.entry(keyword_key(&keyword)).or_insert(0.0) += weight;
            }

            if item
                .entry
                .rating
                .is_some_and(|rating| rating >= self.liked_threshold)
            {
                profile.liked_movie_ids.insert(movie.id);
                if let Some(decade) = movie.decade() {
                    profile.liked_decades.insert(decade);
                }
            }

            profile.history_len += 1;
        }

        if profile.keyword_weight.len() > PROFILE_KEYWORDS {
            profile.keyword_weight = profile
                .top_keywords(PROFILE_KEYWORDS)
                .into_iter()
                .map(|(keyword, weight)| (keyword.to_string(), weight))
                .collect();
        }

        debug!(
            "Built taste profile: {} entries used, {} skipped, {} genres, {} liked",
            profile.history_len,
            skipped,
            profile.genre_weight.len(),
            profile.liked_movie_ids.len()
        );

        Ok(profile)
    }

    fn validate(&self) -> Result<()> {
        let range = f32::from(MIN_RATING)..=f32::from(MAX_RATING);
        if !range.contains(&self.neutral_rating) {
            return Err(EngineError::invalid_input(format!(
                "neutral rating {} is outside [{}, {}]",
                self.neutral_rating, MIN_RATING, MAX_RATING
            )));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.liked_threshold) {
            return Err(EngineError::invalid_input(format!(
                "liked threshold {} is outside [{}, {}]",
                self.liked_threshold, MIN_RATING, MAX_RATING
            )));
        }
        Ok(())
    }
}

impl Default for ProfileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a profile with the default neutral rating and liked threshold.
pub fn build_taste_profile(history: &[HistoryItem<'_>]) -> Result<TasteProfile> {
    ProfileBuilder::new().build(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Movie, WatchedEntry, split_genres};

    fn movie(id: u32, genres: &str, language: &str, date: &str) -> Movie {
        Movie {
            genres: split_genres(genres),
            original_language: Some(language.to_string()),
            release_date: Some(date.to_string()),
            ..Movie::new(id, format!("Movie {}", id))
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_weights_use_rating() {
        let a = movie(1, "Drama, Crime", "en", "1994-09-23");
        let b = movie(2, "Comedy", "fr", "2001-04-25");
        let entries = [
            WatchedEntry::new(1, 1, Some(9)),
            WatchedEntry::new(1, 2, Some(3)),
        ];
        let history = [
            HistoryItem::new(&entries[0], Some(&a)),
            HistoryItem::new(&entries[1], Some(&b)),
        ];

        let profile = build_taste_profile(&history).unwrap();

        assert_eq!(profile.history_len, 2);
        assert!(approx(profile.genre_weight["drama"], 0.9));
        assert!(approx(profile.genre_weight["crime"], 0.9));
        assert!(approx(profile.genre_weight["comedy"], 0.3));
        assert!(approx(profile.language_weight["en"], 0.9));
        assert!(approx(profile.era_weight[&1990], 0.9));
        assert!(approx(profile.era_weight[&2000], 0.3));

        // Affinities are normalised by history length
        assert!(approx(profile.genre_affinity("Drama"), 0.45));
        assert!(approx(profile.language_affinity("FR"), 0.15));
        assert!(approx(profile.era_affinity(2010), 0.0));

        assert!(profile.liked_movie_ids.contains(&1));
        assert!(!profile.liked_movie_ids.contains(&2));
        assert!(profile.liked_era(1990));
        assert!(!profile.liked_era(2000));
    }

    #[test]
    fn test_unrated_uses_neutral_weight() {
        let a = movie(1, "Drama", "en", "1994-09-23");
        let entry = WatchedEntry::new(1, 1, None);
        let history = [HistoryItem::new(&entry, Some(&a))];

        let profile = build_taste_profile(&history).unwrap();
        assert!(approx(profile.genre_weight["drama"], 0.55));
        // Unrated movies are never "liked"
        assert!(profile.liked_movie_ids.is_empty());

        let profile = ProfileBuilder::new()
            .with_neutral_rating(8.0)
            .build(&history)
            .unwrap();
        assert!(approx(profile.genre_weight["drama"], 0.8));
    }

    #[test]
    fn test_liked_threshold_is_inclusive() {
        let a = movie(1, "Drama", "en", "1994-09-23");
        let entry = WatchedEntry::new(1, 1, Some(7));
        let history = [HistoryItem::new(&entry, Some(&a))];

        let profile = build_taste_profile(&history).unwrap();
        assert!(profile.liked_movie_ids.contains(&1));

        let profile = ProfileBuilder::new()
            .with_liked_threshold(8)
            .build(&history)
            .unwrap();
        assert!(profile.liked_movie_ids.is_empty());
    }

    #[test]
    fn test_empty_history_is_cold_start() {
        let profile = build_taste_profile(&[]).unwrap();

        assert!(profile.is_cold_start());
        assert!(profile.genre_weight.is_empty());
        assert_eq!(profile.genre_affinity("Drama"), 0.0);
    }

    #[test]
    fn test_unknown_movies_are_skipped() {
        let entry = WatchedEntry::new(1, 42, Some(9));
        let history = [HistoryItem::new(&entry, None)];

        let profile = build_taste_profile(&history).unwrap();
        assert!(profile.is_cold_start());
    }

    #[test]
    fn test_out_of_range_rating_rejected() {
        let a = movie(1, "Drama", "en", "1994-09-23");
        for bad in [0, 11] {
            let entry = WatchedEntry::new(1, 1, Some(bad));
            let history = [HistoryItem::new(&entry, Some(&a))];

            let err = build_taste_profile(&history).unwrap_err();
            assert!(matches!(err, EngineError::InvalidInput(_)));
        }

        // Even when the movie is unknown
        let entry = WatchedEntry::new(1, 99, Some(12));
        let history = [HistoryItem::new(&entry, None)];
        assert!(build_taste_profile(&history).is_err());
    }

    #[test]
    fn test_missing_fields_only_skip_that_signal() {
        let bare = Movie {
            release_date: Some("1999-10-15".to_string()),
            ..Movie::new(5, "No genres, no language")
        };
        let entry = WatchedEntry::new(1, 5, Some(10));
        let history = [HistoryItem::new(&entry, Some(&bare))];

        let profile = build_taste_profile(&history).unwrap();
        assert!(profile.genre_weight.is_empty());
        assert!(profile.language_weight.is_empty());
        assert!(approx(profile.era_affinity(1990), 1.0));
    }

    #[test]
    fn test_top_genres_order() {
        let a = movie(1, "Drama, Crime", "en", "1994-09-23");
        let b = movie(2, "Drama", "en", "1999-10-15");
        let entries = [
            WatchedEntry::new(1, 1, Some(8)),
            WatchedEntry::new(1, 2, Some(6)),
        ];
        let history = [
            HistoryItem::new(&entries[0], Some(&a)),
            HistoryItem::new(&entries[1], Some(&b)),
        ];

        let profile = build_taste_profile(&history).unwrap();
        let top = profile.top_genres(2);
        assert_eq!(top[0].0, "drama");
        assert_eq!(top[1].0, "crime");
        assert_eq!(profile.top_eras(1)[0].0, 1990);
    }

    #[test]
    fn test_keywords_relative_to_strongest() {
        let a = Movie {
            keywords: Some("prison, friendship, hope".to_string()),
            ..movie(1, "Drama", "en", "1994-09-23")
        };
        let b = Movie {
            keywords: Some("Friendship, heist".to_string()),
            ..movie(2, "Crime", "en", "2001-12-07")
        };
        let entries = [
            WatchedEntry::new(1, 1, Some(8)),
            WatchedEntry::new(1, 2, Some(4)),
        ];
        let history = [
            HistoryItem::new(&entries[0], Some(&a)),
            HistoryItem::new(&entries[1], Some(&b)),
        ];

        let profile = build_taste_profile(&history).unwrap();
        assert!(approx(profile.keyword_weight["friendship"], 1.2));
        assert!(approx(profile.theme_affinity("FRIENDSHIP"), 1.0));
        assert!(approx(profile.theme_affinity("prison"), 0.8 / 1.2));
        assert_eq!(profile.theme_affinity("space"), 0.0);
        assert_eq!(profile.top_keywords(1)[0].0, "friendship");
    }

    #[test]
    fn test_only_strongest_keywords_kept() {
        let keywords: Vec<String> = (0..30).map(|i| format!("kw{:02}", i)).collect();
        let a = Movie {
            keywords: Some(keywords[..10].join(", ")),
            ..movie(1, "Drama", "en", "1994-09-23")
        };
        let b = Movie {
            keywords: Some(keywords[10..].join(", ")),
            ..movie(2, "Drama", "en", "1994-09-23")
        };
        let entries = [
            WatchedEntry::new(1, 1, Some(9)),
            WatchedEntry::new(1, 2, Some(2)),
        ];
        let history = [
            HistoryItem::new(&entries[0], Some(&a)),
            HistoryItem::new(&entries[1], Some(&b)),
        ];

        let profile = build_taste_profile(&history).unwrap();
        assert_eq!(profile.keyword_weight.len(), PROFILE_KEYWORDS);
        // All ten keywords of the higher-rated movie survive
        for keyword in &keywords[..10] {
            assert!(profile.keyword_weight.contains_key(keyword));
        }
    }

    #[test]
    fn test_disliked_decade_is_not_liked() {
        let a = movie(1, "Drama", "en", "1994-09-23");
        let entry = WatchedEntry::new(1, 1, Some(4));
        let history = [HistoryItem::new(&entry, Some(&a))];

        let profile = build_taste_profile(&history).unwrap();
        assert!(profile.era_affinity(1990) > 0.0);
        assert!(!profile.liked_era(1990));
    }

    #[test]
    fn test_bad_builder_config_rejected() {
        let err = ProfileBuilder::new()
            .with_neutral_rating(0.0)
            .build(&[])
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
}
