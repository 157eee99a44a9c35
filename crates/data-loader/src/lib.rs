//! # Data Loader Crate
//!
//! This crate owns the movie catalog, user history and the collaborator
//! contracts the recommendation engine reads through.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Movie, User, WatchedEntry, WatchlistEntry, DataIndex)
//! - **parser**: Parse `::`-delimited .dat files into Rust structs
//! - **index**: Build and validate the in-memory DataIndex
//! - **store**: `Catalog` and `HistoryStore` traits, implemented by DataIndex
//! - **error**: Error types for loading and for store access
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{Catalog, DataIndex, HistoryStore};
//! use std::path::Path;
//!
//! let index = DataIndex::load_from_files(Path::new("data/sample"))?;
//!
//! let watched = index.get_watched(1);
//! let movie = Catalog::get_movie(&index, 603)?;
//! println!("User 1 watched {} movies; 603 is {}", watched.len(), movie.title);
//! ```

pub mod error;
pub mod index;
pub mod parser;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result, StoreError, StoreResult};
pub use store::{Catalog, HistoryStore};
pub use types::{
    // Type aliases
    MovieId,
    UserId,
    // Core types
    DataIndex,
    Movie,
    User,
    WatchedEntry,
    WatchlistEntry,
    // Helpers
    MAX_RATING,
    MIN_RATING,
    decade_of,
    genre_key,
    split_genres,
    split_list,
};
