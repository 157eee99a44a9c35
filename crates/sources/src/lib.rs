//! # Sources Crate
//!
//! The first two stages of the recommendation engine:
//!
//! ### ProfileBuilder
//! Turns a user's watched history into a [`TasteProfile`]: accumulated
//! genre, language, era and keyword weights plus the liked movies and decades.
//!
//! ### CandidateGenerator
//! Lists catalog movies the user has neither watched nor watchlisted,
//! optionally capped to the most popular ones.
//!
//! Both stages are pure reads over the collaborator traits from
//! `data_loader`. They also own [`EngineError`], the error type every later
//! stage returns.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{CandidateGenerator, HistoryItem, ProfileBuilder};
//!
//! let history: Vec<HistoryItem> = /* watched entries joined with movies */;
//! let profile = ProfileBuilder::new().build(&history)?;
//!
//! let candidates = CandidateGenerator::new()
//!     .with_max_candidates(5000)
//!     .generate(catalog.as_ref(), &watched_ids, &watchlist_ids)?;
//! ```

pub mod candidates;
pub mod error;
pub mod profile;
pub mod types;

// Re-export commonly used types
pub use candidates::CandidateGenerator;
pub use error::{EngineError, Result};
pub use profile::{
    DEFAULT_LIKED_THRESHOLD, DEFAULT_NEUTRAL_RATING, PROFILE_KEYWORDS, ProfileBuilder,
    build_taste_profile,
};
pub use types::{CandidateSet, HistoryItem, TasteProfile, keyword_key};
