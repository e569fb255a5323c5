//! Movie detail, credits, and related movies

use futures::stream::{Stream, StreamExt};
use std::sync::Arc;
use tracing::{debug, warn};

use super::bookmark::BookmarkService;
use super::events::{Event, EventBus};
use crate::error::{MovieFinderError, Result};
use crate::load::{as_result, LoadState};
use crate::source::MovieSource;
use crate::types::{Movie, MovieDetail, MovieDetailState, MoviePage};

/// Movie detail service
///
/// Loads a movie's detail with its credits, and its similar and recommended
/// movies, each with current bookmark status.
#[derive(Clone)]
pub struct DetailService {
    source: Arc<dyn MovieSource>,
    bookmarks: BookmarkService,
    event_bus: EventBus,
}

impl DetailService {
    pub fn new(source: Arc<dyn MovieSource>, bookmarks: BookmarkService, event_bus: EventBus) -> Self {
        Self {
            source,
            bookmarks,
            event_bus,
        }
    }

    /// Detail and credits as one state: both succeed or the screen errors.
    ///
    /// Emits `Loading`, then one terminal state. A failure is also reported
    /// as [`Event::DetailFailed`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// use futures::StreamExt;
    /// use libmoviefinder::service::MovieFinderService;
    ///
    /// # async fn example(service: MovieFinderService) {
    /// let states: Vec<_> = service.detail().load(533535).collect().await;
    /// if let Some(loaded) = states.last().and_then(|s| s.success()) {
    ///     println!("{}", loaded.detail.title);
    /// }
    /// # }
    /// ```
    pub fn load(
        &self,
        movie_id: i64,
    ) -> impl Stream<Item = LoadState<MovieDetailState>> + Send + 'static {
        let service = self.clone();
        let event_bus = self.event_bus.clone();

        as_result(async move { service.fetch(movie_id).await }).inspect(move |state| {
            if let Some(error) = state.error() {
                warn!("Detail for movie {} failed: {}", movie_id, error);
                event_bus.emit(Event::DetailFailed { movie_id, error });
            }
        })
    }

    /// Detail and credits with bookmark status, errors unclassified.
    ///
    /// For callers that need the underlying error, such as exit codes.
    pub async fn fetch(&self, movie_id: i64) -> Result<MovieDetailState> {
        debug!("Fetching detail and credits for movie {}", movie_id);
        let (detail, credits) = futures::try_join!(
            self.source.movie_detail(movie_id),
            self.source.movie_credits(movie_id)
        )?;
        let detail = self.bookmarks.overlay_detail(detail).await?;
        Ok(MovieDetailState { detail, credits })
    }

    /// Similar movies for a detail screen, first page only
    pub fn similar_state(
        &self,
        movie_id: i64,
    ) -> impl Stream<Item = LoadState<Vec<Movie>>> + Send + 'static {
        let service = self.clone();
        as_result(async move { Ok(service.similar(movie_id, 1).await?.results) })
    }

    /// One page of movies similar to `movie_id`
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for page 0, or the source or database error.
    pub async fn similar(&self, movie_id: i64, page: u32) -> Result<MoviePage> {
        check_page(page)?;
        let mut result = self.source.similar_movies(movie_id, page).await?;
        result.results = self.bookmarks.overlay(&result.results).await?;
        Ok(result)
    }

    /// One page of movies recommended for `movie_id`
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for page 0, or the source or database error.
    pub async fn recommended(&self, movie_id: i64, page: u32) -> Result<MoviePage> {
        check_page(page)?;
        let mut result = self.source.recommended_movies(movie_id, page).await?;
        result.results = self.bookmarks.overlay(&result.results).await?;
        Ok(result)
    }

    /// Toggle the bookmark from a detail screen and return the updated detail
    pub async fn toggle_bookmark(&self, detail: &MovieDetail) -> Result<MovieDetail> {
        let bookmarked = self.bookmarks.toggle(&detail.as_movie()).await?;
        Ok(MovieDetail {
            bookmarked,
            ..detail.clone()
        })
    }
}

fn check_page(page: u32) -> Result<()> {
    if page == 0 {
        return Err(MovieFinderError::InvalidInput(
            "page numbers start at 1".to_string(),
        ));
    }
    Ok(())
}
