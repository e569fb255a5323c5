//! Service layer for MovieFinder
//!
//! This module exposes the state a UI renders, so that CLIs and graphical
//! front ends share the same behavior.
//!
//! # Architecture
//!
//! `MovieFinderService` is the entry point and owns the shared resources
//! (bookmark database, movie source, event bus). The sub-services are:
//!
//! - `HomeService`: per-section aggregation of the four list categories
//! - `DetailService`: detail + credits, similar and recommended movies
//! - `BookmarkService`: bookmark overlay and serialized toggles
//! - `EventBus`: failure and bookmark notifications
//!
//! # Example
//!
//! ```no_run
//! use libmoviefinder::service::MovieFinderService;
//!
//! # async fn example() -> libmoviefinder::Result<()> {
//! let service = MovieFinderService::new().await?;
//!
//! let sections = service.home().load_sections().await;
//! for (list_type, state) in sections.ordered() {
//!     println!("{}: {:?}", list_type, state.success().map(|m| m.len()));
//! }
//! # Ok(())
//! # }
//! ```

pub mod bookmark;
pub mod detail;
pub mod events;
pub mod home;

pub use events::Event;
pub use home::SectionsState;

use self::bookmark::BookmarkService;
use self::detail::DetailService;
use self::events::EventBus;
use self::home::HomeService;
use crate::error::{ConfigError, MovieFinderError};
use crate::source::tmdb::TmdbSource;
use crate::source::MovieSource;
use crate::{Config, Database, Result};
use std::sync::Arc;

pub struct MovieFinderService {
    config: Arc<Config>,
    home: HomeService,
    detail: DetailService,
    bookmarks: BookmarkService,
    event_bus: EventBus,
}

impl MovieFinderService {
    /// Load configuration from the default location and connect to TMDB
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, no access token is
    /// configured, or the bookmark database cannot be opened.
    pub async fn new() -> Result<Self> {
        let config = Config::load_or_default()?;
        Self::from_config(config).await
    }

    /// Create a service that talks to TMDB using `config`
    pub async fn from_config(config: Config) -> Result<Self> {
        let source = TmdbSource::new(&config.api)?;
        Self::with_source(config, Arc::new(source)).await
    }

    /// Create a service over any movie source (e.g., the mock in tests)
    pub async fn with_source(config: Config, source: Arc<dyn MovieSource>) -> Result<Self> {
        let db = Self::open_database(&config).await?;
        Ok(Self::with_parts(config, source, db))
    }

    /// Create a service that only needs the bookmark store.
    ///
    /// Remote calls fail with an authentication error until a token is
    /// configured; local bookmark operations work regardless.
    pub async fn offline(config: Config) -> Result<Self> {
        let db = Self::open_database(&config).await?;
        let source: Arc<dyn MovieSource> = match TmdbSource::new(&config.api) {
            Ok(source) => Arc::new(source),
            Err(e) => {
                tracing::debug!("Remote source unavailable: {}", e);
                Arc::new(unconfigured::UnconfiguredSource)
            }
        };
        Ok(Self::with_parts(config, source, db))
    }

    async fn open_database(config: &Config) -> Result<Database> {
        let db_path = crate::config::resolve_db_path(Some(&config.database.path))?;
        let db_path_str = db_path.to_str().ok_or_else(|| {
            MovieFinderError::Config(ConfigError::MissingField(
                "Invalid database path".to_string(),
            ))
        })?;
        Database::new(db_path_str).await
    }

    fn with_parts(config: Config, source: Arc<dyn MovieSource>, db: Database) -> Self {
        let db = Arc::new(db);
        let event_bus = EventBus::new(100);

        let bookmarks = BookmarkService::new(Arc::clone(&db), event_bus.clone());
        let home = HomeService::new(Arc::clone(&source), bookmarks.clone(), event_bus.clone());
        let detail = DetailService::new(source, bookmarks.clone(), event_bus.clone());

        Self {
            config: Arc::new(config),
            home,
            detail,
            bookmarks,
            event_bus,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn home(&self) -> &HomeService {
        &self.home
    }

    pub fn detail(&self) -> &DetailService {
        &self.detail
    }

    pub fn bookmarks(&self) -> &BookmarkService {
        &self.bookmarks
    }

    /// Subscribe to failure and bookmark notifications
    pub fn subscribe(&self) -> events::EventReceiver {
        self.event_bus.subscribe()
    }
}

mod unconfigured {
    use async_trait::async_trait;

    use crate::error::{ApiError, Result};
    use crate::source::MovieSource;
    use crate::types::{MovieCredits, MovieDetail, MovieListType, MoviePage};

    /// Stand-in for a remote source with no access token
    pub(super) struct UnconfiguredSource;

    fn missing_token<T>() -> Result<T> {
        Err(ApiError::Authentication(
            "no TMDB access token configured (set MOVIEFINDER_TMDB_TOKEN)".to_string(),
        )
        .into())
    }

    #[async_trait]
    impl MovieSource for UnconfiguredSource {
        fn name(&self) -> &str {
            "unconfigured"
        }

        async fn movies(&self, _list_type: MovieListType, _page: u32) -> Result<MoviePage> {
            missing_token()
        }

        async fn movie_detail(&self, _movie_id: i64) -> Result<MovieDetail> {
            missing_token()
        }

        async fn movie_credits(&self, _movie_id: i64) -> Result<MovieCredits> {
            missing_token()
        }

        async fn similar_movies(&self, _movie_id: i64, _page: u32) -> Result<MoviePage> {
            missing_token()
        }

        async fn recommended_movies(&self, _movie_id: i64, _page: u32) -> Result<MoviePage> {
            missing_token()
        }
    }
}
