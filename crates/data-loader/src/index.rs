//! DataIndex building and indexing logic.
//!
//! This module builds the DataIndex from parsed data:
//! - Parse the four data files in parallel
//! - Insert users, movies and history
//! - Build the popularity order used for candidate listing
//! - Validate references and rating ranges

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::path::Path;
use tracing::info;

impl DataIndex {
    /// Load the catalog and user history from a directory
    ///
    /// Expects `users.dat`, `movies.dat`, `watched.dat` and `watchlist.dat`.
    ///
    /// Steps:
    /// 1. Parse all four files in parallel
    /// 2. Build primary indices
    /// 3. Build the popularity order
    /// 4. Validate data integrity
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("Loading catalog and history from {:?}", data_dir);

        let users_path = data_dir.join("users.dat");
        let movies_path = data_dir.join("movies.dat");
        let watched_path = data_dir.join("watched.dat");
        let watchlist_path = data_dir.join("watchlist.dat");

        // Nested joins give four-way parallelism
        let ((users, movies), (watched, watchlist)) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_users(&users_path),
                    || parser::parse_movies(&movies_path),
                )
            },
            || {
                rayon::join(
                    || parser::parse_watched(&watched_path),
                    || parser::parse_watchlist(&watchlist_path),
                )
            },
        );

        let users = users?;
        let movies = movies?;
        let watched = watched?;
        let watchlist = watchlist?;

        info!(
            "Parsed {} users, {} movies, {} watched entries, {} watchlist entries",
            users.len(),
            movies.len(),
            watched.len(),
            watchlist.len()
        );

        let index = Self::from_records(users, movies, watched, watchlist)?;

        info!("DataIndex successfully built and validated");
        Ok(index)
    }

    /// Build a validated index from already-parsed records
    pub fn from_records(
        users: Vec<User>,
        movies: Vec<Movie>,
        watched: Vec<WatchedEntry>,
        watchlist: Vec<WatchlistEntry>,
    ) -> Result<Self> {
        let mut index = DataIndex::new();

        for user in users {
            if index.users.contains_key(&user.id) {
                return Err(DataLoadError::Duplicate {
                    entity: "User".to_string(),
                    id: user.id,
                });
            }
            index.insert_user(user);
        }

        for movie in movies {
            if index.movies.contains_key(&movie.id) {
                return Err(DataLoadError::Duplicate {
                    entity: "Movie".to_string(),
                    id: movie.id,
                });
            }
            index.insert_movie(movie);
        }

        for entry in watched {
            index.insert_watched(entry);
        }

        for entry in watchlist {
            index.insert_watchlist(entry);
        }

        index.build_popularity_order();
        index.validate()?;
        Ok(index)
    }

    /// Sort all movie ids by popularity (descending), then by id.
    ///
    /// Must be called again after inserting movies by hand.
    pub fn build_popularity_order(&mut self) {
        let mut order: Vec<(MovieId, f32)> = self
            .movies
            .par_iter()
            .map(|(&id, movie)| (id, movie.popularity))
            .collect();

        order.par_sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        self.popularity_order = order.into_iter().map(|(id, _)| id).collect();
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - Every history entry references an existing user and movie
    /// - Ratings are in the valid range (1 - 10)
    pub fn validate(&self) -> Result<()> {
        for (user_id, entries) in &self.watched {
            self.check_user(*user_id)?;
            for entry in entries {
                self.check_movie(entry.movie_id)?;
                if let Some(rating) = entry.rating
                    && !(MIN_RATING..=MAX_RATING).contains(&rating)
                {
                    return Err(DataLoadError::InvalidValue {
                        field: "rating".to_string(),
                        value: rating.to_string(),
                    });
                }
            }
        }

        for (user_id, entries) in &self.watchlist {
            self.check_user(*user_id)?;
            for entry in entries {
                self.check_movie(entry.movie_id)?;
            }
        }

        Ok(())
    }

    fn check_user(&self, id: UserId) -> Result<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(DataLoadError::MissingReference {
                entity: "User".to_string(),
                id,
            })
        }
    }

    fn check_movie(&self, id: MovieId) -> Result<()> {
        if self.movies.contains_key(&id) {
            Ok(())
        } else {
            Err(DataLoadError::MissingReference {
                entity: "Movie".to_string(),
                id,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: UserId) -> User {
        User {
            id,
            username: format!("user{}", id),
            email: format!("user{}@example.com", id),
        }
    }

    fn movie(id: MovieId, popularity: f32) -> Movie {
        Movie {
            popularity,
            ..Movie::new(id, format!("Movie {}", id))
        }
    }

    #[test]
    fn test_popularity_order() {
        let index = DataIndex::from_records(
            vec![],
            vec![movie(1, 5.0), movie(2, 50.0), movie(3, 5.0), movie(4, 20.0)],
            vec![],
            vec![],
        )
        .unwrap();

        // Ties on popularity fall back to ascending id
        assert_eq!(index.popularity_order(), &[2, 4, 1, 3]);
    }

    #[test]
    fn test_rating_out_of_range_rejected() {
        let result = DataIndex::from_records(
            vec![user(1)],
            vec![movie(10, 1.0)],
            vec![WatchedEntry::new(1, 10, Some(11))],
            vec![],
        );
        assert!(matches!(result, Err(DataLoadError::InvalidValue { .. })));

        let result = DataIndex::from_records(
            vec![user(1)],
            vec![movie(10, 1.0)],
            vec![WatchedEntry::new(1, 10, Some(0))],
            vec![],
        );
        assert!(matches!(result, Err(DataLoadError::InvalidValue { .. })));
    }

    #[test]
    fn test_dangling_references_rejected() {
        let result = DataIndex::from_records(
            vec![user(1)],
            vec![movie(10, 1.0)],
            vec![WatchedEntry::new(1, 99, Some(5))],
            vec![],
        );
        assert!(matches!(
            result,
            Err(DataLoadError::MissingReference { id: 99, .. })
        ));

        let result = DataIndex::from_records(
            vec![user(1)],
            vec![movie(10, 1.0)],
            vec![],
            vec![WatchlistEntry {
                user_id: 2,
                movie_id: 10,
                added_at: None,
            }],
        );
        assert!(matches!(
            result,
            Err(DataLoadError::MissingReference { id: 2, .. })
        ));
    }

    #[test]
    fn test_duplicate_movie_rejected() {
        let result = DataIndex::from_records(vec![], vec![movie(1, 1.0), movie(1, 2.0)], vec![], vec![]);
        assert!(matches!(result, Err(DataLoadError::Duplicate { id: 1, .. })));
    }

    #[test]
    fn test_rewatch_keeps_latest_entry() {
        let index = DataIndex::from_records(
            vec![user(1)],
            vec![movie(10, 1.0)],
            vec![
                WatchedEntry::new(1, 10, Some(4)),
                WatchedEntry::new(1, 10, Some(8)),
            ],
            vec![],
        )
        .unwrap();

        let watched = index.get_watched(1);
        assert_eq!(watched.len(), 1);
        assert_eq!(watched[0].rating, Some(8));
    }

    #[test]
    fn test_load_sample_dataset() {
        // Sample data ships with the repository under data/sample
        let data_dir = Path::new("../../data/sample");

        if data_dir.exists() {
            let index = DataIndex::load_from_files(data_dir).unwrap();
            let (users, movies, watched, watchlist) = index.counts();

            assert_eq!(users, 3);
            assert_eq!(movies, 16);
            assert_eq!(watched, 9);
            assert_eq!(watchlist, 3);
        }
    }
}
