//! Mock movie source for testing
//!
//! Serves in-memory lists and details with configurable per-list failures
//! and delays. Failures can be changed while the source is shared, so tests
//! can fail a fetch and then let the retry succeed.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{ApiError, Result};
use crate::source::MovieSource;
use crate::types::{
    CastMember, CrewMember, Movie, MovieCredits, MovieDetail, MovieListType, MoviePage,
    MovieStatus,
};

/// Results per page, matching TMDB
pub const PAGE_SIZE: usize = 20;

/// Which remote call was made, for verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Movies(MovieListType, u32),
    Detail(i64),
    Credits(i64),
    Similar(i64, u32),
    Recommended(i64, u32),
}

#[derive(Default)]
struct MockState {
    lists: HashMap<MovieListType, Vec<Movie>>,
    list_failures: HashMap<MovieListType, ApiError>,
    list_delays: HashMap<MovieListType, Duration>,
    details: HashMap<i64, MovieDetail>,
    credits: HashMap<i64, MovieCredits>,
    similar: HashMap<i64, Vec<Movie>>,
    recommended: HashMap<i64, Vec<Movie>>,
    detail_failure: Option<ApiError>,
    calls: Vec<MockCall>,
}

/// Mock source; clones share state
#[derive(Clone, Default)]
pub struct MockSource {
    state: Arc<Mutex<MockState>>,
}

impl MockSource {
    /// Create an empty mock source. Every list is empty and every detail
    /// lookup returns a 404 status error.
    pub fn new() -> Self {
        Self::default()
    }

    /// A source preloaded with a small catalogue in every list, plus
    /// detail and credits for "Deadpool & Wolverine" (533535).
    pub fn with_fixtures() -> Self {
        let source = Self::new();
        for list_type in MovieListType::ALL {
            source.set_list(list_type, fixture_movies(list_type));
        }
        source.set_detail(fixture_detail());
        source.set_credits(533535, fixture_credits());
        source.set_similar(533535, fixture_movies(MovieListType::Popular));
        source.set_recommended(533535, fixture_movies(MovieListType::TopRated));
        source
    }

    pub fn set_list(&self, list_type: MovieListType, movies: Vec<Movie>) {
        self.state.lock().unwrap().lists.insert(list_type, movies);
    }

    /// Make fetches of `list_type` fail with `error`
    pub fn fail_list(&self, list_type: MovieListType, error: ApiError) {
        self.state
            .lock()
            .unwrap()
            .list_failures
            .insert(list_type, error);
    }

    pub fn clear_failure(&self, list_type: MovieListType) {
        self.state.lock().unwrap().list_failures.remove(&list_type);
    }

    pub fn delay_list(&self, list_type: MovieListType, delay: Duration) {
        self.state.lock().unwrap().list_delays.insert(list_type, delay);
    }

    pub fn set_detail(&self, detail: MovieDetail) {
        self.state.lock().unwrap().details.insert(detail.id, detail);
    }

    pub fn set_credits(&self, movie_id: i64, credits: MovieCredits) {
        self.state.lock().unwrap().credits.insert(movie_id, credits);
    }

    pub fn set_similar(&self, movie_id: i64, movies: Vec<Movie>) {
        self.state.lock().unwrap().similar.insert(movie_id, movies);
    }

    pub fn set_recommended(&self, movie_id: i64, movies: Vec<Movie>) {
        self.state.lock().unwrap().recommended.insert(movie_id, movies);
    }

    /// Make detail and credits lookups fail (`None` restores them)
    pub fn fail_details(&self, error: Option<ApiError>) {
        self.state.lock().unwrap().detail_failure = error;
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: MockCall) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn not_found(what: &str, movie_id: i64) -> ApiError {
        ApiError::Status {
            status: 404,
            message: format!("{} for movie {} could not be found", what, movie_id),
        }
    }
}

fn paginate(movies: &[Movie], page: u32) -> MoviePage {
    let total_pages = movies.len().div_ceil(PAGE_SIZE) as u32;
    let start = (page.saturating_sub(1) as usize) * PAGE_SIZE;
    let results = movies.iter().skip(start).take(PAGE_SIZE).cloned().collect();

    MoviePage {
        page,
        total_pages,
        results,
    }
}

#[async_trait]
impl MovieSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn movies(&self, list_type: MovieListType, page: u32) -> Result<MoviePage> {
        self.record(MockCall::Movies(list_type, page));

        let delay = self.state.lock().unwrap().list_delays.get(&list_type).copied();
        if let Some(delay) = delay {
            sleep(delay).await;
        }

        let state = self.state.lock().unwrap();
        if let Some(error) = state.list_failures.get(&list_type) {
            return Err(error.clone().into());
        }

        let movies = state.lists.get(&list_type).map(Vec::as_slice).unwrap_or(&[]);
        Ok(paginate(movies, page))
    }

    async fn movie_detail(&self, movie_id: i64) -> Result<MovieDetail> {
        self.record(MockCall::Detail(movie_id));

        let state = self.state.lock().unwrap();
        if let Some(error) = &state.detail_failure {
            return Err(error.clone().into());
        }
        state
            .details
            .get(&movie_id)
            .cloned()
            .ok_or_else(|| Self::not_found("Detail", movie_id).into())
    }

    async fn movie_credits(&self, movie_id: i64) -> Result<MovieCredits> {
        self.record(MockCall::Credits(movie_id));

        let state = self.state.lock().unwrap();
        if let Some(error) = &state.detail_failure {
            return Err(error.clone().into());
        }
        state
            .credits
            .get(&movie_id)
            .cloned()
            .ok_or_else(|| Self::not_found("Credits", movie_id).into())
    }

    async fn similar_movies(&self, movie_id: i64, page: u32) -> Result<MoviePage> {
        self.record(MockCall::Similar(movie_id, page));

        let state = self.state.lock().unwrap();
        let movies = state.similar.get(&movie_id).map(Vec::as_slice).unwrap_or(&[]);
        Ok(paginate(movies, page))
    }

    async fn recommended_movies(&self, movie_id: i64, page: u32) -> Result<MoviePage> {
        self.record(MockCall::Recommended(movie_id, page));

        let state = self.state.lock().unwrap();
        let movies = state
            .recommended
            .get(&movie_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        Ok(paginate(movies, page))
    }
}

fn fixture_movie(id: i64, title: &str, vote_average: f64) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        poster_path: format!("/{}.jpg", id),
        vote_average,
        overview: None,
        bookmarked: false,
    }
}

/// Three movies per list, ids unique per list
pub fn fixture_movies(list_type: MovieListType) -> Vec<Movie> {
    match list_type {
        MovieListType::NowPlaying => vec![
            fixture_movie(533535, "Deadpool & Wolverine", 7.7),
            fixture_movie(762441, "A Quiet Place: Day One", 6.9),
            fixture_movie(718821, "Twisters", 7.0),
        ],
        MovieListType::Popular => vec![
            fixture_movie(762441, "A Quiet Place: Day One", 6.9),
            fixture_movie(1022789, "Inside Out 2", 7.6),
            fixture_movie(519182, "Despicable Me 4", 7.1),
        ],
        MovieListType::TopRated => vec![
            fixture_movie(278, "The Shawshank Redemption", 8.7),
            fixture_movie(238, "The Godfather", 8.7),
            fixture_movie(240, "The Godfather Part II", 8.6),
        ],
        MovieListType::Upcoming => vec![
            fixture_movie(1184918, "The Wild Robot", 8.5),
            fixture_movie(917496, "Beetlejuice Beetlejuice", 7.2),
            fixture_movie(1034541, "Terrifier 3", 6.9),
        ],
    }
}

fn fixture_detail() -> MovieDetail {
    MovieDetail {
        id: 533535,
        title: "Deadpool & Wolverine".to_string(),
        overview: Some(
            "A listless Wade Wilson toils away in civilian life with his days as the \
             morally flexible mercenary, Deadpool, behind him."
                .to_string(),
        ),
        poster_path: "/8cdWjvZQUExUUTzyp4t6EDMubfO.jpg".to_string(),
        backdrop_path: "/yDHYTfA3R0jFYba16jBB1ef8oIt.jpg".to_string(),
        release_date: Some("2024-07-24".to_string()),
        runtime: Some(128),
        vote_average: 7.7,
        genres: vec!["Action".to_string(), "Comedy".to_string(), "Science Fiction".to_string()],
        status: MovieStatus::Released,
        bookmarked: false,
    }
}

fn fixture_credits() -> MovieCredits {
    MovieCredits::from_members(
        vec![
            CastMember {
                id: 10859,
                name: "Ryan Reynolds".to_string(),
                character: "Wade Wilson / Deadpool".to_string(),
                profile_path: String::new(),
            },
            CastMember {
                id: 6968,
                name: "Hugh Jackman".to_string(),
                character: "Logan / Wolverine".to_string(),
                profile_path: String::new(),
            },
        ],
        vec![CrewMember {
            id: 17825,
            job: "Director".to_string(),
            name: "Shawn Levy".to_string(),
            profile_path: String::new(),
        }],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MovieFinderError;

    #[tokio::test]
    async fn test_fixture_lists() {
        let source = MockSource::with_fixtures();

        let page = source.movies(MovieListType::NowPlaying, 1).await.unwrap();
        assert_eq!(page.results.len(), 3);
        assert_eq!(page.results[0].title, "Deadpool & Wolverine");
        assert_eq!(page.total_pages, 1);
        assert_eq!(source.calls(), vec![MockCall::Movies(MovieListType::NowPlaying, 1)]);
    }

    #[tokio::test]
    async fn test_pagination() {
        let source = MockSource::new();
        let movies: Vec<_> = (0..45).map(|i| fixture_movie(i, "m", 5.0)).collect();
        source.set_list(MovieListType::Popular, movies);

        let page2 = source.movies(MovieListType::Popular, 2).await.unwrap();
        assert_eq!(page2.total_pages, 3);
        assert_eq!(page2.results.len(), PAGE_SIZE);
        assert_eq!(page2.results[0].id, 20);

        let page3 = source.movies(MovieListType::Popular, 3).await.unwrap();
        assert_eq!(page3.results.len(), 5);
        assert!(!page3.has_next());

        let page4 = source.movies(MovieListType::Popular, 4).await.unwrap();
        assert!(page4.results.is_empty());
    }

    #[tokio::test]
    async fn test_list_failure_and_recovery() {
        let source = MockSource::with_fixtures();
        source.fail_list(MovieListType::Popular, ApiError::Network("offline".to_string()));

        let err = source.movies(MovieListType::Popular, 1).await.unwrap_err();
        assert!(matches!(err, MovieFinderError::Api(ApiError::Network(_))));

        source.clear_failure(MovieListType::Popular);
        assert!(source.movies(MovieListType::Popular, 1).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_detail_is_404() {
        let source = MockSource::new();
        let err = source.movie_detail(1).await.unwrap_err();
        assert!(matches!(
            err,
            MovieFinderError::Api(ApiError::Status { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_delay() {
        let source = MockSource::with_fixtures();
        source.delay_list(MovieListType::Upcoming, Duration::from_millis(50));

        let start = std::time::Instant::now();
        source.movies(MovieListType::Upcoming, 1).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
