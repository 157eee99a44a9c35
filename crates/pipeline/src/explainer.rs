//! Turns score components into short human-readable reasons.
//!
//! Reasons are derived from the same numbers the Scorer produced, so a
//! reason only appears when its signal actually moved the score.

use crate::scorer::ScoredCandidate;
use crate::signals::SignalKind;
use data_loader::Movie;
use sources::{EngineError, Result, TasteProfile};

/// Reason given to cold-start users
pub const POPULAR_CHOICE: &str = "Popular choice";

/// Reason given when nothing individually stands out
pub const OVERALL_TASTE: &str = "Based on your overall taste profile";

pub const DEFAULT_MIN_CONTRIBUTION: f32 = 0.05;
pub const DEFAULT_MAX_REASONS: usize = 3;

/// Quality above this component value is phrased as "Highly rated"
pub const DEFAULT_HIGH_QUALITY_FLOOR: f32 = 0.65;

/// Shared keywords named in a theme reason
const MAX_THEMES_NAMED: usize = 3;

#[derive(Debug, Clone)]
pub struct Explainer {
    min_contribution: f32,
    max_reasons: usize,
    high_quality_floor: f32,
}

impl Explainer {
    pub fn new() -> Self {
        Self {
            min_contribution: DEFAULT_MIN_CONTRIBUTION,
            max_reasons: DEFAULT_MAX_REASONS,
            high_quality_floor: DEFAULT_HIGH_QUALITY_FLOOR,
        }
    }

    pub fn with_min_contribution(mut self, min_contribution: f32) -> Result<Self> {
        if !min_contribution.is_finite() || !(0.0..=1.0).contains(&min_contribution) {
            return Err(EngineError::invalid_input(format!(
                "reason threshold {} is outside [0, 1]",
                min_contribution
            )));
        }
        self.min_contribution = min_contribution;
        Ok(self)
    }

    pub fn with_max_reasons(mut self, max_reasons: usize) -> Result<Self> {
        if max_reasons == 0 {
            return Err(EngineError::invalid_input(
                "at least one reason per item is required",
            ));
        }
        self.max_reasons = max_reasons;
        Ok(self)
    }

    pub fn with_high_quality_floor(mut self, floor: f32) -> Self {
        self.high_quality_floor = floor;
        self
    }

    /// Reasons for one scored candidate, strongest contribution first.
    ///
    /// Always returns at least one reason.
    pub fn explain(&self, profile: &TasteProfile, scored: &ScoredCandidate) -> Vec<String> {
        if scored.cold_start {
            return vec![POPULAR_CHOICE.to_string()];
        }

        let mut reasons: Vec<(f32, String)> = Vec::new();
        for kind in SignalKind::ALL {
            let contribution = scored.contributions.get(kind);
            if contribution < self.min_contribution {
                continue;
            }
            if let Some(phrase) = self.phrase(kind, profile, scored) {
                reasons.push((contribution, phrase));
            }
        }

        // Stable sort: equal contributions keep signal order
        reasons.sort_by(|a, b| b.0.total_cmp(&a.0));
        reasons.truncate(self.max_reasons);

        if reasons.is_empty() {
            return vec![OVERALL_TASTE.to_string()];
        }
        reasons.into_iter().map(|(_, phrase)| phrase).collect()
    }

    fn phrase(
        &self,
        kind: SignalKind,
        profile: &TasteProfile,
        scored: &ScoredCandidate,
    ) -> Option<String> {
        let movie = &scored.movie;
        match kind {
            SignalKind::Genre => strongest_genre(profile, movie)
                .map(|genre| format!("Matches your interest in {}", genre)),
            SignalKind::Language => movie.language_key().map(|code| {
                format!("In {}, like movies you've watched", language_name(&code))
            }),
            SignalKind::Era => movie.decade().map(|decade| {
                if profile.liked_era(decade) {
                    format!("Similar era to movies you liked ({}s)", decade)
                } else {
                    format!("Similar era to movies you've watched ({}s)", decade)
                }
            }),
            SignalKind::Theme => {
                let themes = shared_themes(profile, movie);
                (!themes.is_empty()).then(|| format!("Shared themes: {}", themes.join(", ")))
            }
            SignalKind::Quality => Some(if scored.components.quality >= self.high_quality_floor {
                format!("Highly rated ({:.1}/10)", movie.vote_average)
            } else if movie.vote_count == 0 {
                "No ratings yet".to_string()
            } else {
                format!(
                    "Rated {:.1}/10 by {} viewers",
                    movie.vote_average, movie.vote_count
                )
            }),
        }
    }
}

impl Default for Explainer {
    fn default() -> Self {
        Self::new()
    }
}

/// Candidate genre with the highest affinity, in the movie's own spelling.
/// Earlier genres win ties.
fn strongest_genre<'a>(profile: &TasteProfile, movie: &'a Movie) -> Option<&'a str> {
    let mut best: Option<(&str, f32)> = None;
    for genre in &movie.genres {
        let affinity = profile.genre_affinity(genre);
        if affinity <= 0.0 {
            continue;
        }
        if best.is_none_or(|(_, top)| affinity > top) {
            best = Some((genre.as_str(), affinity));
        }
    }
    best.map(|(genre, _)| genre)
}

/// Candidate keywords the user also watched, strongest first.
fn shared_themes(profile: &TasteProfile, movie: &Movie) -> Vec<String> {
    let mut shared: Vec<(f32, String)> = movie
        .keyword_list()
        .into_iter()
        .map(|keyword| (profile.theme_affinity(&keyword), keyword))
        .filter(|(affinity, _)| *affinity > 0.0)
        .collect();
    shared.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    shared
        .into_iter()
        .take(MAX_THEMES_NAMED)
        .map(|(_, keyword)| keyword)
        .collect()
}

/// Display name for an ISO 639-1 code; unknown codes are upper-cased.
pub fn language_name(code: &str) -> String {
    let name = match code.trim().to_lowercase().as_str() {
        "en" => "English",
        "fr" => "French",
        "es" => "Spanish",
        "de" => "German",
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh" => "Chinese",
        "hi" => "Hindi",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ru" => "Russian",
        other => return other.to_uppercase(),
    };
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::Scorer;
    use data_loader::{WatchedEntry, split_genres};
    use sources::{HistoryItem, build_taste_profile};

    fn liked_movie() -> Movie {
        Movie {
            genres: split_genres("Drama, Crime"),
            original_language: Some("en".to_string()),
            release_date: Some("1994-09-23".to_string()),
            vote_average: 8.7,
            vote_count: 24_000,
            ..Movie::new(1, "Liked")
        }
    }

    fn profile() -> TasteProfile {
        let movie = liked_movie();
        let entry = WatchedEntry::new(1, 1, Some(9));
        build_taste_profile(&[HistoryItem::new(&entry, Some(&movie))]).unwrap()
    }

    #[test]
    fn test_reasons_follow_contributions() {
        let profile = profile();
        let candidate = Movie {
            genres: split_genres("Comedy, Crime"),
            original_language: Some("en".to_string()),
            release_date: Some("1999-10-15".to_string()),
            vote_average: 8.4,
            vote_count: 27_000,
            ..Movie::new(2, "Candidate")
        };
        let scored = Scorer::default().score(&profile, candidate);
        let reasons = Explainer::new().explain(&profile, &scored);

        // quality 0.25*~0.84, genre 0.35*0.45, language 0.15*0.9, era 0.15*0.9
        assert_eq!(reasons.len(), 3);
        assert!(reasons[0].starts_with("Highly rated (8.4/10)"));
        assert_eq!(reasons[1], "Matches your interest in Crime");
        assert_eq!(reasons[2], "In English, like movies you've watched");
    }

    #[test]
    fn test_max_reasons_respected() {
        let profile = profile();
        let scored = Scorer::default().score(&profile, liked_movie());
        let reasons = Explainer::new()
            .with_max_reasons(1)
            .unwrap()
            .explain(&profile, &scored);
        assert_eq!(reasons.len(), 1);
    }

    #[test]
    fn test_cold_start_reason() {
        let profile = TasteProfile::default();
        let scored = Scorer::default().score(&profile, liked_movie());
        assert_eq!(
            Explainer::new().explain(&profile, &scored),
            vec![POPULAR_CHOICE.to_string()]
        );
    }

    #[test]
    fn test_fallback_when_nothing_stands_out() {
        let profile = profile();
        let candidate = Movie {
            genres: split_genres("Animation"),
            original_language: Some("ja".to_string()),
            release_date: Some("2016-08-26".to_string()),
            vote_average: 1.0,
            vote_count: 100_000,
            ..Movie::new(3, "Nothing in common")
        };
        let scored = Scorer::default().score(&profile, candidate);
        assert_eq!(
            Explainer::new().explain(&profile, &scored),
            vec![OVERALL_TASTE.to_string()]
        );
    }

    #[test]
    fn test_unmatched_genre_never_named() {
        let profile = profile();
        let candidate = Movie {
            genres: split_genres("Comedy"),
            original_language: Some("en".to_string()),
            release_date: Some("1995-01-01".to_string()),
            ..Movie::new(4, "Comedy")
        };
        let scored = Scorer::default().score(&profile, candidate);
        let reasons = Explainer::new().explain(&profile, &scored);
        assert!(reasons.iter().all(|r| !r.contains("Comedy")));
        assert!(reasons.iter().any(|r| r.contains("1990s")));
    }

    #[test]
    fn test_disliked_era_is_not_called_liked() {
        let watched = Movie {
            release_date: Some("1994-06-01".to_string()),
            ..Movie::new(1, "Disliked")
        };
        let entry = WatchedEntry::new(1, 1, Some(4));
        let profile = build_taste_profile(&[HistoryItem::new(&entry, Some(&watched))]).unwrap();

        let candidate = Movie {
            release_date: Some("1996-03-01".to_string()),
            ..Movie::new(2, "Same decade")
        };
        let scored = Scorer::default().score(&profile, candidate);
        assert!(scored.contributions.era >= DEFAULT_MIN_CONTRIBUTION);

        let reasons = Explainer::new().explain(&profile, &scored);
        assert!(reasons.contains(&"Similar era to movies you've watched (1990s)".to_string()));
        assert!(reasons.iter().all(|r| !r.contains("you liked")));
    }

    #[test]
    fn test_moderate_quality_still_explained() {
        let profile = profile();
        let candidate = Movie {
            genres: split_genres("Drama"),
            vote_average: 6.0,
            vote_count: 5000,
            ..Movie::new(5, "Decent drama")
        };
        let scored = Scorer::default().score(&profile, candidate);
        assert!(scored.components.quality < DEFAULT_HIGH_QUALITY_FLOOR);
        assert!(scored.contributions.quality >= DEFAULT_MIN_CONTRIBUTION);

        let reasons = Explainer::new().explain(&profile, &scored);
        assert!(reasons.contains(&"Rated 6.0/10 by 5000 viewers".to_string()));
        assert!(reasons.contains(&"Matches your interest in Drama".to_string()));
    }

    #[test]
    fn test_shared_themes_named() {
        let watched = Movie {
            keywords: Some("prison, friendship, hope".to_string()),
            ..liked_movie()
        };
        let entry = WatchedEntry::new(1, 1, Some(9));
        let profile = build_taste_profile(&[HistoryItem::new(&entry, Some(&watched))]).unwrap();

        let candidate = Movie {
            keywords: Some("redemption, hope, friendship".to_string()),
            vote_average: 1.0,
            vote_count: 100_000,
            ..Movie::new(6, "Themes only")
        };
        let scored = Scorer::default().score(&profile, candidate);
        let reasons = Explainer::new().explain(&profile, &scored);
        assert_eq!(reasons, vec!["Shared themes: friendship, hope".to_string()]);
    }

    #[test]
    fn test_language_names() {
        assert_eq!(language_name("en"), "English");
        assert_eq!(language_name("KO"), "Korean");
        assert_eq!(language_name("sv"), "SV");
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(Explainer::new().with_max_reasons(0).is_err());
        assert!(Explainer::new().with_min_contribution(1.5).is_err());
    }
}
