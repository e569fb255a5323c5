//! MovieFinder - browse TMDB movie lists and keep local bookmarks
//!
//! This library fetches movie lists and details from TMDB, keeps bookmarks
//! in a local SQLite store, and exposes the `Loading/Success/Error` state a
//! front end renders.

pub mod config;
pub mod db;
pub mod error;
pub mod load;
pub mod logging;
pub mod service;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use db::Database;
pub use error::{MovieFinderError, Result, RootError};
pub use load::LoadState;
pub use types::{Movie, MovieListType};
