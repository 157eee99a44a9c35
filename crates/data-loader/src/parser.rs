//! Parser for the catalog and history data files.
//!
//! All files are UTF-8, one record per line, fields separated by `::`:
//! - users.dat: userId::username::email
//! - movies.dat: id::title::genres::language::release_date::vote_average::vote_count::
//!   popularity::revenue::budget::poster_path::backdrop_path::keywords::overview
//! - watched.dat: userId::movieId::rating::watched_date::notes
//! - watchlist.dat: userId::movieId::added_at
//!
//! Empty fields mean "absent". Blank lines are skipped.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::path::Path;
use std::str::FromStr;

const MOVIE_FIELDS: usize = 14;
const WATCHED_FIELDS: usize = 5;
const WATCHLIST_FIELDS: usize = 3;
const USER_FIELDS: usize = 3;

/// Read a data file into a string, mapping a missing file to `FileNotFound`
fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

/// Iterate over the non-blank lines of a file together with their 1-based line number
fn records(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty())
}

/// Split a record into exactly `expected` fields; the last field keeps any
/// remaining `::` separators.
fn split_fields<'a>(
    line: &'a str,
    expected: usize,
    file: &str,
    line_no: usize,
) -> Result<Vec<&'a str>> {
    let parts: Vec<&str> = line.splitn(expected, "::").collect();
    if parts.len() < expected {
        return Err(DataLoadError::FieldCountMismatch {
            file: file.to_string(),
            expected,
            found: parts.len(),
            line: line_no,
        });
    }
    Ok(parts)
}

/// Parse a required field
fn required<T>(value: &str, name: &str, file: &str, line_no: usize) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = value.trim();
    if value.is_empty() {
        return Err(DataLoadError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: format!("Missing {}", name),
        });
    }
    value.parse().map_err(|e| DataLoadError::ParseError {
        file: file.to_string(),
        line: line_no,
        reason: format!("Invalid {}: {}", name, e),
    })
}

/// Parse an optional field; empty means `None`
fn optional<T>(value: &str, name: &str, file: &str, line_no: usize) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if value.trim().is_empty() {
        Ok(None)
    } else {
        required(value, name, file, line_no).map(Some)
    }
}

/// Optional free-text field
fn text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub fn parse_users(path: &Path) -> Result<Vec<User>> {
    parse_user_lines(&read_file(path)?)
}

pub(crate) fn parse_user_lines(content: &str) -> Result<Vec<User>> {
    const FILE: &str = "users.dat";
    let mut users = Vec::new();

    for (line_no, line) in records(content) {
        let parts = split_fields(line, USER_FIELDS, FILE, line_no)?;
        users.push(User {
            id: required(parts[0], "userId", FILE, line_no)?,
            username: parts[1].trim().to_string(),
            email: parts[2].trim().to_string(),
        });
    }

    Ok(users)
}

/// Parse the movies.dat file
///
/// Genres are comma-separated: "Drama, Crime". Numeric fields that are
/// empty default to zero so a sparse catalog row still loads.
pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    parse_movie_lines(&read_file(path)?)
}

pub(crate) fn parse_movie_lines(content: &str) -> Result<Vec<Movie>> {
    const FILE: &str = "movies.dat";
    let mut movies = Vec::new();

    for (line_no, line) in records(content) {
        let parts = split_fields(line, MOVIE_FIELDS, FILE, line_no)?;

        let vote_average: f32 =
            optional(parts[5], "vote_average", FILE, line_no)?.unwrap_or(0.0);
        if !(0.0..=10.0).contains(&vote_average) {
            return Err(DataLoadError::InvalidValue {
                field: "vote_average".to_string(),
                value: vote_average.to_string(),
            });
        }

        movies.push(Movie {
            id: required(parts[0], "movieId", FILE, line_no)?,
            title: parts[1].trim().to_string(),
            genres: split_genres(parts[2]),
            original_language: text(parts[3]),
            release_date: text(parts[4]),
            vote_average,
            vote_count: optional(parts[6], "vote_count", FILE, line_no)?.unwrap_or(0),
            popularity: optional(parts[7], "popularity", FILE, line_no)?.unwrap_or(0.0),
            revenue: optional(parts[8], "revenue", FILE, line_no)?.unwrap_or(0),
            budget: optional(parts[9], "budget", FILE, line_no)?.unwrap_or(0),
            poster_path: text(parts[10]),
            backdrop_path: text(parts[11]),
            keywords: text(parts[12]),
            overview: text(parts[13]),
        });
    }

    Ok(movies)
}

/// Parse the watched.dat file. An empty rating means "watched, not rated".
pub fn parse_watched(path: &Path) -> Result<Vec<WatchedEntry>> {
    parse_watched_lines(&read_file(path)?)
}

pub(crate) fn parse_watched_lines(content: &str) -> Result<Vec<WatchedEntry>> {
    const FILE: &str = "watched.dat";
    let mut entries = Vec::new();

    for (line_no, line) in records(content) {
        let parts = split_fields(line, WATCHED_FIELDS, FILE, line_no)?;
        entries.push(WatchedEntry {
            user_id: required(parts[0], "userId", FILE, line_no)?,
            movie_id: required(parts[1], "movieId", FILE, line_no)?,
            rating: optional(parts[2], "rating", FILE, line_no)?,
            watched_date: text(parts[3]),
            notes: text(parts[4]),
        });
    }

    Ok(entries)
}

pub fn parse_watchlist(path: &Path) -> Result<Vec<WatchlistEntry>> {
    parse_watchlist_lines(&read_file(path)?)
}

pub(crate) fn parse_watchlist_lines(content: &str) -> Result<Vec<WatchlistEntry>> {
    const FILE: &str = "watchlist.dat";
    let mut entries = Vec::new();

    for (line_no, line) in records(content) {
        let parts = split_fields(line, WATCHLIST_FIELDS, FILE, line_no)?;
        entries.push(WatchlistEntry {
            user_id: required(parts[0], "userId", FILE, line_no)?,
            movie_id: required(parts[1], "movieId", FILE, line_no)?,
            added_at: text(parts[2]),
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_movie_line() {
        let content = "603::The Matrix::Action, Science Fiction::en::1999-03-30::8.2::24000::77.5::463517383::63000000::/p.jpg::/b.jpg::hacker, simulation::Set in the 22nd century :: a hacker learns the truth\n";
        let movies = parse_movie_lines(content).unwrap();

        assert_eq!(movies.len(), 1);
        let movie = &movies[0];
        assert_eq!(movie.id, 603);
        assert_eq!(movie.genres, vec!["Action", "Science Fiction"]);
        assert_eq!(movie.original_language.as_deref(), Some("en"));
        assert_eq!(movie.release_year(), Some(1999));
        assert_eq!(movie.vote_count, 24000);
        assert_eq!(movie.keywords.as_deref(), Some("hacker, simulation"));
        // The overview keeps its own separators
        assert!(movie.overview.as_deref().unwrap().contains(":: a hacker"));
    }

    #[test]
    fn test_parse_sparse_movie_line() {
        let content = "7::Untitled::::::::::::::::::::::::\n";
        let movies = parse_movie_lines(content).unwrap();

        assert_eq!(movies[0].id, 7);
        assert!(movies[0].genres.is_empty());
        assert_eq!(movies[0].original_language, None);
        assert_eq!(movies[0].vote_count, 0);
        assert_eq!(movies[0].decade(), None);
    }

    #[test]
    fn test_movie_line_too_short() {
        let err = parse_movie_lines("\n1::Only Title::Drama\n").unwrap_err();
        match err {
            DataLoadError::FieldCountMismatch { line, expected, .. } => {
                assert_eq!(line, 2);
                assert_eq!(expected, MOVIE_FIELDS);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_watched_optional_rating() {
        let content = "1::603::9::2024-01-02::loved it\n1::604::::2024-01-03::\n";
        let entries = parse_watched_lines(content).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].rating, Some(9));
        assert_eq!(entries[0].notes.as_deref(), Some("loved it"));
        assert_eq!(entries[1].rating, None);
        assert_eq!(entries[1].notes, None);
    }

    #[test]
    fn test_parse_watched_bad_rating() {
        let err = parse_watched_lines("1::603::great::::\n").unwrap_err();
        assert!(matches!(err, DataLoadError::ParseError { line: 1, .. }));
    }

    #[test]
    fn test_parse_users_and_watchlist() {
        let users = parse_user_lines("1::alice::alice@example.com\n").unwrap();
        assert_eq!(users[0].username, "alice");

        let list = parse_watchlist_lines("1::42::2024-02-01T10:00:00\n1::43::\n").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].added_at.as_deref(), Some("2024-02-01T10:00:00"));
        assert_eq!(list[1].added_at, None);
    }

    #[test]
    fn test_missing_file() {
        let err = parse_users(Path::new("definitely/not/here/users.dat")).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }
}
