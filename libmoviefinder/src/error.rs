//! Error types for MovieFinder

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MovieFinderError>;

#[derive(Error, Debug)]
pub enum MovieFinderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl MovieFinderError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            MovieFinderError::InvalidInput(_) => 3,
            MovieFinderError::Api(ApiError::Authentication(_)) => 2,
            MovieFinderError::Api(_) => 1,
            MovieFinderError::Config(_) => 1,
            MovieFinderError::Database(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database operation failed: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Request failed: {0}")]
    Request(String),
}

/// True if `err` or anything in its source chain is an I/O error
fn has_io_source(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<std::io::Error>() {
            return true;
        }
        current = e.source();
    }
    false
}

impl From<reqwest::Error> for ApiError {
    /// Transport faults (refused, reset or dropped connections, timeouts,
    /// interrupted bodies) become `Network`. Builder, redirect, status and
    /// decode failures do not.
    fn from(err: reqwest::Error) -> Self {
        let transport = err.is_connect()
            || err.is_timeout()
            || err.is_request()
            || err.is_body()
            || (!err.is_builder() && !err.is_status() && has_io_source(&err));

        if transport {
            ApiError::Network(err.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ApiError::Request(err.to_string())
        }
    }
}

impl From<reqwest::Error> for MovieFinderError {
    fn from(err: reqwest::Error) -> Self {
        MovieFinderError::Api(err.into())
    }
}

/// Closed failure taxonomy shown to users.
///
/// Every failure caught at the [`crate::load`] boundary resolves to exactly
/// one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RootError {
    NoInternet,
    Unknown,
}

impl RootError {
    /// Classify a failure.
    ///
    /// Only remote connectivity faults map to `NoInternet`. Local store
    /// failures, including disk I/O, map to `Unknown` with everything else.
    pub fn classify(error: &MovieFinderError) -> Self {
        match error {
            MovieFinderError::Api(ApiError::Network(_)) => RootError::NoInternet,
            _ => RootError::Unknown,
        }
    }

    /// Message suitable for a transient notification
    pub fn user_message(&self) -> &'static str {
        match self {
            RootError::NoInternet => "No internet connection. Check your network and retry.",
            RootError::Unknown => "Something went wrong. Please retry.",
        }
    }
}

impl std::fmt::Display for RootError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RootError::NoInternet => write!(f, "NO_INTERNET"),
            RootError::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl From<&MovieFinderError> for RootError {
    fn from(error: &MovieFinderError) -> Self {
        RootError::classify(error)
    }
}
