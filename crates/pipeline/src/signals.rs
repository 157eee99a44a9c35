//! The fixed table of scoring signals.
//!
//! Each signal is a pure function `(profile, movie, policy) -> [0, 1]`.
//! The Scorer weights and sums them; the Explainer turns the same numbers
//! into reasons. Adding a signal means adding a `SignalKind` variant and a
//! row in [`SIGNALS`].

use data_loader::Movie;
use serde::Serialize;
use sources::TasteProfile;

/// Votes needed before a movie's own average carries half the weight
pub const DEFAULT_QUALITY_PRIOR_VOTES: f32 = 100.0;

/// Quality value assumed for a movie nobody has voted on
pub const NEUTRAL_QUALITY: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Genre,
    Language,
    Era,
    Theme,
    Quality,
}

impl SignalKind {
    /// All signals, in tie-break order
    pub const ALL: [SignalKind; 5] = [
        SignalKind::Genre,
        SignalKind::Language,
        SignalKind::Era,
        SignalKind::Theme,
        SignalKind::Quality,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SignalKind::Genre => "genre_affinity",
            SignalKind::Language => "language_affinity",
            SignalKind::Era => "era_affinity",
            SignalKind::Theme => "theme_affinity",
            SignalKind::Quality => "quality_signal",
        }
    }
}

/// Tunables that signals read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalPolicy {
    pub quality_prior_votes: f32,
}

impl Default for SignalPolicy {
    fn default() -> Self {
        Self {
            quality_prior_votes: DEFAULT_QUALITY_PRIOR_VOTES,
        }
    }
}

pub type SignalFn = fn(&TasteProfile, &Movie, &SignalPolicy) -> f32;

pub struct Signal {
    pub kind: SignalKind,
    pub compute: SignalFn,
}

pub const SIGNALS: [Signal; 5] = [
    Signal {
        kind: SignalKind::Genre,
        compute: genre_affinity,
    },
    Signal {
        kind: SignalKind::Language,
        compute: language_affinity,
    },
    Signal {
        kind: SignalKind::Era,
        compute: era_affinity,
    },
    Signal {
        kind: SignalKind::Theme,
        compute: theme_affinity,
    },
    Signal {
        kind: SignalKind::Quality,
        compute: quality_signal,
    },
];

/// Mean normalised affinity over the candidate's genres; 0 without genres.
pub fn genre_affinity(profile: &TasteProfile, movie: &Movie, _policy: &SignalPolicy) -> f32 {
    if movie.genres.is_empty() {
        return 0.0;
    }
    let total: f32 = movie
        .genres
        .iter()
        .map(|genre| profile.genre_affinity(genre))
        .sum();
    total / movie.genres.len() as f32
}

pub fn language_affinity(profile: &TasteProfile, movie: &Movie, _policy: &SignalPolicy) -> f32 {
    movie
        .original_language
        .as_deref()
        .map(|lang| profile.language_affinity(lang))
        .unwrap_or(0.0)
}

pub fn era_affinity(profile: &TasteProfile, movie: &Movie, _policy: &SignalPolicy) -> f32 {
    movie
        .decade()
        .map(|decade| profile.era_affinity(decade))
        .unwrap_or(0.0)
}

/// Strongest theme affinity among the candidate's keywords; 0 without overlap.
pub fn theme_affinity(profile: &TasteProfile, movie: &Movie, _policy: &SignalPolicy) -> f32 {
    movie
        .keyword_list()
        .iter()
        .map(|keyword| profile.theme_affinity(keyword))
        .fold(0.0, f32::max)
}

pub fn quality_signal(_profile: &TasteProfile, movie: &Movie, policy: &SignalPolicy) -> f32 {
    damped_quality(movie.vote_average, movie.vote_count, policy.quality_prior_votes)
}

/// Vote average scaled to `[0, 1]`, pulled toward 0.5 when votes are few.
///
/// `confidence = votes / (votes + prior)`, result
/// `confidence * avg/10 + (1 - confidence) * 0.5`. Zero votes gives exactly 0.5.
pub fn damped_quality(vote_average: f32, vote_count: u32, prior_votes: f32) -> f32 {
    let raw = if vote_average.is_finite() {
        (vote_average / 10.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let votes = vote_count as f32;
    let denominator = votes + prior_votes.max(0.0);
    if denominator <= 0.0 {
        return NEUTRAL_QUALITY;
    }
    let confidence = votes / denominator;
    confidence * raw + (1.0 - confidence) * NEUTRAL_QUALITY
}

/// One value per signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ComponentScores {
    pub genre: f32,
    pub language: f32,
    pub era: f32,
    pub theme: f32,
    pub quality: f32,
}

impl ComponentScores {
    /// Evaluate every signal in the table
    pub fn compute(profile: &TasteProfile, movie: &Movie, policy: &SignalPolicy) -> Self {
        let mut scores = Self::default();
        for signal in &SIGNALS {
            scores.set(signal.kind, (signal.compute)(profile, movie, policy));
        }
        scores
    }

    pub fn get(&self, kind: SignalKind) -> f32 {
        match kind {
            SignalKind::Genre => self.genre,
            SignalKind::Language => self.language,
            SignalKind::Era => self.era,
            SignalKind::Theme => self.theme,
            SignalKind::Quality => self.quality,
        }
    }

    pub fn set(&mut self, kind: SignalKind, value: f32) {
        let value = if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            0.0
        };
        match kind {
            SignalKind::Genre => self.genre = value,
            SignalKind::Language => self.language = value,
            SignalKind::Era => self.era = value,
            SignalKind::Theme => self.theme = value,
            SignalKind::Quality => self.quality = value,
        }
    }
}
