//! Remote movie sources
//!
//! This module provides the trait every movie backend implements. The
//! production backend talks to TMDB over HTTP; the mock backend serves
//! in-memory fixtures with configurable failures and delays.
//!
//! # Examples
//!
//! ```no_run
//! use libmoviefinder::config::Config;
//! use libmoviefinder::source::{MovieSource, tmdb::TmdbSource};
//! use libmoviefinder::types::MovieListType;
//!
//! # async fn example() -> libmoviefinder::error::Result<()> {
//! let config = Config::load()?;
//! let source = TmdbSource::new(&config.api)?;
//!
//! let page = source.movies(MovieListType::Popular, 1).await?;
//! for movie in page.results {
//!     println!("{} ({:.1})", movie.title, movie.vote_average);
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{MovieCredits, MovieDetail, MovieListType, MoviePage};

pub mod mock;
pub mod tmdb;

/// A backend that serves movie lists and details.
///
/// Implementations return raw records: every `bookmarked` flag is false.
/// Bookmark status is joined in by the service layer at read time.
#[async_trait]
pub trait MovieSource: Send + Sync {
    /// Lowercase identifier of the backend (e.g., "tmdb", "mock")
    fn name(&self) -> &str;

    /// One page of a list category. Pages start at 1.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` when the host is unreachable, or another
    /// `ApiError` variant for HTTP or decoding failures.
    async fn movies(&self, list_type: MovieListType, page: u32) -> Result<MoviePage>;

    async fn movie_detail(&self, movie_id: i64) -> Result<MovieDetail>;

    /// Director and top-billed cast
    async fn movie_credits(&self, movie_id: i64) -> Result<MovieCredits>;

    async fn similar_movies(&self, movie_id: i64, page: u32) -> Result<MoviePage>;

    async fn recommended_movies(&self, movie_id: i64, page: u32) -> Result<MoviePage>;
}
