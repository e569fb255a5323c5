//! Three-state wrapper around one asynchronous fetch
//!
//! A fetch is observed as `Loading` followed by exactly one terminal state.
//! Failures are classified into [`RootError`] here and never reach the
//! consumer as raw errors.
//!
//! # Example
//!
//! ```no_run
//! use futures::StreamExt;
//! use libmoviefinder::load::{as_result, LoadState};
//!
//! # async fn example() {
//! let mut states = Box::pin(as_result(async { Ok::<_, libmoviefinder::MovieFinderError>(42) }));
//! while let Some(state) = states.next().await {
//!     match state {
//!         LoadState::Loading => println!("loading..."),
//!         LoadState::Success(value) => println!("got {}", value),
//!         LoadState::Error(err) => println!("failed: {}", err),
//!     }
//! }
//! # }
//! ```

use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::error;

use crate::error::{Result, RootError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum LoadState<T> {
    Loading,
    Success(T),
    Error(RootError),
}

impl<T> LoadState<T> {
    /// Classify a finished fetch into a terminal state
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => LoadState::Success(value),
            Err(e) => {
                error!("Fetch failed: {}", e);
                LoadState::Error(RootError::classify(&e))
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_loading()
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            LoadState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<RootError> {
        match self {
            LoadState::Error(e) => Some(*e),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> LoadState<U> {
        match self {
            LoadState::Loading => LoadState::Loading,
            LoadState::Success(value) => LoadState::Success(f(value)),
            LoadState::Error(e) => LoadState::Error(e),
        }
    }
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Loading
    }
}

/// Turn one fetch into `[Loading, Success | Error]`.
///
/// The fetch is not started until the stream is polled past `Loading`.
/// Dropping the stream cancels it. Calling this again re-issues the fetch
/// from `Loading`.
pub fn as_result<T, F>(fetch: F) -> impl Stream<Item = LoadState<T>>
where
    F: Future<Output = Result<T>>,
{
    stream::once(async { LoadState::Loading })
        .chain(stream::once(async move { LoadState::from_result(fetch.await) }))
}
