//! Home screen sections
//!
//! Each list category is fetched independently and concurrently. The
//! aggregate [`SectionsState`] maps every category to its own
//! `Loading/Success/Error` state; a failing section never blocks or fails
//! its siblings. Failures are reported as [`Event::SectionFailed`]
//! notifications.

use futures::future::ready;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

use super::bookmark::{overlay_with, BookmarkService};
use super::events::{Event, EventBus};
use crate::error::{MovieFinderError, Result};
use crate::load::{as_result, LoadState};
use crate::source::MovieSource;
use crate::types::{Movie, MovieListType, MoviePage};

pub type SectionState = LoadState<Vec<Movie>>;

/// Per-section state for every [`MovieListType`]
///
/// Always holds exactly one entry per list type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionsState {
    sections: BTreeMap<MovieListType, SectionState>,
}

impl Default for SectionsState {
    fn default() -> Self {
        Self::loading()
    }
}

impl SectionsState {
    /// Every section loading
    pub fn loading() -> Self {
        Self {
            sections: MovieListType::ALL
                .iter()
                .map(|t| (*t, LoadState::Loading))
                .collect(),
        }
    }

    pub fn get(&self, list_type: MovieListType) -> &SectionState {
        // Populated for every key on construction and never removed
        &self.sections[&list_type]
    }

    pub fn set(&mut self, list_type: MovieListType, state: SectionState) {
        self.sections.insert(list_type, state);
    }

    /// Sections in display order, independent of completion order
    pub fn ordered(&self) -> impl Iterator<Item = (MovieListType, &SectionState)> + '_ {
        MovieListType::ALL.iter().map(move |t| (*t, self.get(*t)))
    }

    pub fn is_complete(&self) -> bool {
        self.sections.values().all(LoadState::is_terminal)
    }

    pub fn failed(&self) -> Vec<MovieListType> {
        self.ordered()
            .filter(|(_, s)| s.error().is_some())
            .map(|(t, _)| t)
            .collect()
    }

    pub fn succeeded(&self) -> Vec<MovieListType> {
        self.ordered()
            .filter(|(_, s)| s.success().is_some())
            .map(|(t, _)| t)
            .collect()
    }

    /// Re-apply a bookmark set to every loaded section.
    ///
    /// Call on each render pass so toggles made elsewhere show up.
    pub fn with_bookmarks(&self, bookmarks: &HashSet<i64>) -> Self {
        Self {
            sections: self
                .sections
                .iter()
                .map(|(t, s)| (*t, s.clone().map(|movies| overlay_with(&movies, bookmarks))))
                .collect(),
        }
    }
}

/// Home screen service
///
/// Loads the four list sections concurrently and tracks each one's state
/// independently. Every list it returns carries current bookmark status.
#[derive(Clone)]
pub struct HomeService {
    source: Arc<dyn MovieSource>,
    bookmarks: BookmarkService,
    event_bus: EventBus,
}

impl HomeService {
    pub fn new(source: Arc<dyn MovieSource>, bookmarks: BookmarkService, event_bus: EventBus) -> Self {
        Self {
            source,
            bookmarks,
            event_bus,
        }
    }

    /// Snapshots of the aggregate, starting with every section loading.
    ///
    /// One snapshot follows each section's terminal transition; the stream
    /// ends once all sections are terminal. Dropping it cancels in-flight
    /// fetches.
    pub fn watch_sections(&self) -> impl Stream<Item = SectionsState> + Send + 'static {
        let merged = stream::select_all(MovieListType::ALL.iter().map(|t| self.section_stream(*t)));
        let initial = SectionsState::loading();

        stream::once(ready(initial.clone())).chain(
            merged
                .filter(|(_, state)| ready(state.is_terminal()))
                .scan(initial, |sections, (list_type, state)| {
                    sections.set(list_type, state);
                    ready(Some(sections.clone()))
                }),
        )
    }

    /// Load every section and return the final aggregate
    ///
    /// Never fails as a whole: a section that fails holds its own `Error`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use libmoviefinder::service::MovieFinderService;
    ///
    /// # async fn example(service: MovieFinderService) {
    /// let sections = service.home().load_sections().await;
    /// for list_type in sections.failed() {
    ///     eprintln!("{} could not be loaded", list_type.label());
    /// }
    /// # }
    /// ```
    pub async fn load_sections(&self) -> SectionsState {
        self.watch_sections()
            .fold(SectionsState::loading(), |_, snapshot| ready(snapshot))
            .await
    }

    /// Re-issue one section's fetch, starting again from `Loading`
    pub fn retry_section(
        &self,
        list_type: MovieListType,
    ) -> impl Stream<Item = SectionState> + Send + 'static {
        self.section_stream(list_type).map(|(_, state)| state)
    }

    /// One page of a list, with current bookmark status
    ///
    /// # Arguments
    ///
    /// * `list_type` - Which list to fetch
    /// * `page` - Page number, starting at 1
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for page 0, or the source or database error.
    pub async fn list_page(&self, list_type: MovieListType, page: u32) -> Result<MoviePage> {
        if page == 0 {
            return Err(MovieFinderError::InvalidInput(
                "page numbers start at 1".to_string(),
            ));
        }

        let mut result = self.source.movies(list_type, page).await?;
        result.results = self.bookmarks.overlay(&result.results).await?;
        Ok(result)
    }

    fn section_stream(
        &self,
        list_type: MovieListType,
    ) -> BoxStream<'static, (MovieListType, SectionState)> {
        let source = Arc::clone(&self.source);
        let bookmarks = self.bookmarks.clone();
        let event_bus = self.event_bus.clone();

        as_result(async move {
            debug!("Fetching section {} from {}", list_type, source.name());
            let page = source.movies(list_type, 1).await?;
            bookmarks.overlay(&page.results).await
        })
        .map(move |state| {
            if let Some(error) = state.error() {
                warn!("Section {} failed: {}", list_type, error);
                event_bus.emit(Event::SectionFailed { list_type, error });
            }
            (list_type, state)
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, RootError};
    use crate::source::mock::MockSource;
    use crate::Database;
    use std::time::Duration;
    use tempfile::TempDir;

    async fn setup(source: MockSource) -> (HomeService, EventBus, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(Database::new(db_path.to_str().unwrap()).await.unwrap());
        let event_bus = EventBus::new(100);
        let bookmarks = BookmarkService::new(db, event_bus.clone());
        let service = HomeService::new(Arc::new(source), bookmarks, event_bus.clone());
        (service, event_bus, temp_dir)
    }

    #[test]
    fn test_loading_has_every_section() {
        let state = SectionsState::loading();
        let keys: Vec<_> = state.ordered().map(|(t, _)| t).collect();
        assert_eq!(keys, MovieListType::ALL.to_vec());
        assert!(!state.is_complete());
    }

    #[tokio::test]
    async fn test_all_sections_succeed() {
        let (service, _bus, _temp_dir) = setup(MockSource::with_fixtures()).await;

        let sections = service.load_sections().await;
        assert!(sections.is_complete());
        assert_eq!(sections.succeeded(), MovieListType::ALL.to_vec());

        let now_playing = sections.get(MovieListType::NowPlaying).success().unwrap();
        assert_eq!(now_playing[0].title, "Deadpool & Wolverine");
    }

    #[tokio::test]
    async fn test_one_failing_section_does_not_affect_siblings() {
        let source = MockSource::with_fixtures();
        source.fail_list(MovieListType::Popular, ApiError::Network("offline".to_string()));
        let (service, bus, _temp_dir) = setup(source).await;
        let mut events = bus.subscribe();

        let sections = service.load_sections().await;

        assert_eq!(sections.succeeded().len(), 3);
        assert_eq!(sections.failed(), vec![MovieListType::Popular]);
        assert_eq!(
            sections.get(MovieListType::Popular).error(),
            Some(RootError::NoInternet)
        );
        assert_eq!(sections.ordered().count(), 4);

        assert_eq!(
            events.recv().await.unwrap(),
            Event::SectionFailed {
                list_type: MovieListType::Popular,
                error: RootError::NoInternet,
            }
        );
    }

    #[tokio::test]
    async fn test_snapshots_follow_completion_but_render_in_display_order() {
        let source = MockSource::with_fixtures();
        source.delay_list(MovieListType::NowPlaying, Duration::from_millis(300));
        let (service, _bus, _temp_dir) = setup(source).await;

        let snapshots: Vec<_> = service.watch_sections().collect().await;
        assert_eq!(snapshots.len(), 5);
        assert!(snapshots[0].ordered().all(|(_, s)| s.is_loading()));

        // The slow section is the last to finish
        assert!(snapshots[3].get(MovieListType::NowPlaying).is_loading());
        assert!(snapshots[4].is_complete());

        let order: Vec<_> = snapshots[4].ordered().map(|(t, _)| t).collect();
        assert_eq!(order, MovieListType::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_retry_section_restarts_from_loading() {
        let source = MockSource::with_fixtures();
        source.fail_list(MovieListType::TopRated, ApiError::Request("boom".to_string()));
        let (service, _bus, _temp_dir) = setup(source.clone()).await;

        let mut sections = service.load_sections().await;
        assert_eq!(
            sections.get(MovieListType::TopRated).error(),
            Some(RootError::Unknown)
        );

        source.clear_failure(MovieListType::TopRated);
        let states: Vec<_> = service.retry_section(MovieListType::TopRated).collect().await;
        assert_eq!(states.len(), 2);
        assert!(states[0].is_loading());
        assert!(states[1].success().is_some());

        for state in states {
            sections.set(MovieListType::TopRated, state);
        }
        assert!(sections.failed().is_empty());
    }

    #[tokio::test]
    async fn test_sections_carry_bookmark_status() {
        let (service, _bus, _temp_dir) = setup(MockSource::with_fixtures()).await;
        service
            .bookmarks
            .toggle(&Movie::new(762441, "A Quiet Place: Day One"))
            .await
            .unwrap();

        let sections = service.load_sections().await;

        // Same movie appears in two sections; both reflect membership
        for list_type in [MovieListType::NowPlaying, MovieListType::Popular] {
            let movies = sections.get(list_type).success().unwrap();
            let quiet_place = movies.iter().find(|m| m.id == 762441).unwrap();
            assert!(quiet_place.bookmarked);
        }
    }

    #[tokio::test]
    async fn test_with_bookmarks_refreshes_rendered_state() {
        let (service, _bus, _temp_dir) = setup(MockSource::with_fixtures()).await;
        let sections = service.load_sections().await;

        service
            .bookmarks
            .toggle(&Movie::new(278, "The Shawshank Redemption"))
            .await
            .unwrap();

        let ids = service.bookmarks.bookmarked_ids().await.unwrap();
        let refreshed = sections.with_bookmarks(&ids);
        let top_rated = refreshed.get(MovieListType::TopRated).success().unwrap();
        assert!(top_rated[0].bookmarked);

        // The old snapshot is untouched
        let stale = sections.get(MovieListType::TopRated).success().unwrap();
        assert!(!stale[0].bookmarked);
    }

    #[tokio::test]
    async fn test_list_page_reflects_toggle_on_reload() {
        let (service, _bus, _temp_dir) = setup(MockSource::with_fixtures()).await;

        let page = service.list_page(MovieListType::Upcoming, 1).await.unwrap();
        let movie = page.results[0].clone();
        assert!(!movie.bookmarked);

        service.bookmarks.toggle(&movie).await.unwrap();
        let reloaded = service.list_page(MovieListType::Upcoming, 1).await.unwrap();
        assert!(reloaded.results[0].bookmarked);

        service.bookmarks.toggle(&movie).await.unwrap();
        let reloaded = service.list_page(MovieListType::Upcoming, 1).await.unwrap();
        assert!(!reloaded.results[0].bookmarked);
    }

    #[tokio::test]
    async fn test_list_page_zero_is_invalid() {
        let (service, _bus, _temp_dir) = setup(MockSource::with_fixtures()).await;
        let err = service.list_page(MovieListType::Popular, 0).await.unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_sections_serialize_by_key() {
        let json = serde_json::to_value(SectionsState::loading()).unwrap();
        assert_eq!(json["sections"]["now_playing"]["state"], "loading");
        assert_eq!(json["sections"]["upcoming"]["state"], "loading");
    }
}
