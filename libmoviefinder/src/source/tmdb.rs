//! TMDB v3 REST backend

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::{ApiError, ConfigError, Result};
use crate::source::MovieSource;
use crate::types::{
    CastMember, CrewMember, Movie, MovieCredits, MovieDetail, MovieListType, MoviePage,
    MovieStatus,
};

pub struct TmdbSource {
    http: reqwest::Client,
    base_url: Url,
    token: SecretString,
    language: String,
}

impl TmdbSource {
    /// Build a client from the API section of the config
    ///
    /// # Errors
    ///
    /// Fails if no access token is configured or the base URL is invalid.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let token = config.access_token()?;

        // Url::join drops the last segment unless the base ends with '/'
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| {
            ConfigError::MissingField(format!("api.base_url is not a valid URL: {}", e))
        })?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ApiError::from)?;

        Ok(Self {
            http,
            base_url,
            token,
            language: config.language.clone(),
        })
    }

    fn endpoint(&self, path: &str, page: Option<u32>) -> Result<Url> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::Request(format!("invalid endpoint '{}': {}", path, e)))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("language", &self.language);
            if let Some(page) = page {
                query.append_pair("page", &page.to_string());
            }
        }

        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, page: Option<u32>) -> Result<T> {
        let url = self.endpoint(path, page)?;
        debug!("GET {}", url.path());

        let response = self
            .http
            .get(url)
            .bearer_auth(self.token.expose_secret())
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.status_message)
                .unwrap_or(body);
            warn!("TMDB returned {} for {}: {}", status, path, message);

            return Err(match status {
                StatusCode::UNAUTHORIZED => ApiError::Authentication(message),
                _ => ApiError::Status {
                    status: status.as_u16(),
                    message,
                },
            }
            .into());
        }

        // A body cut off mid-read is a transport fault, whatever reqwest tags it
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(format!("{}: {}", path, e)))?;
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::Decode(format!("{}: {}", path, e)).into())
    }
}

#[async_trait]
impl MovieSource for TmdbSource {
    fn name(&self) -> &str {
        "tmdb"
    }

    async fn movies(&self, list_type: MovieListType, page: u32) -> Result<MoviePage> {
        let response: MovieListResponse = self
            .get(&format!("movie/{}", list_type.as_path()), Some(page))
            .await?;
        Ok(response.into())
    }

    async fn movie_detail(&self, movie_id: i64) -> Result<MovieDetail> {
        let response: MovieDetailResponse = self.get(&format!("movie/{}", movie_id), None).await?;
        Ok(response.into())
    }

    async fn movie_credits(&self, movie_id: i64) -> Result<MovieCredits> {
        let response: MovieCreditsResponse = self
            .get(&format!("movie/{}/credits", movie_id), None)
            .await?;
        Ok(response.into())
    }

    async fn similar_movies(&self, movie_id: i64, page: u32) -> Result<MoviePage> {
        let response: MovieListResponse = self
            .get(&format!("movie/{}/similar", movie_id), Some(page))
            .await?;
        Ok(response.into())
    }

    async fn recommended_movies(&self, movie_id: i64, page: u32) -> Result<MoviePage> {
        let response: MovieListResponse = self
            .get(&format!("movie/{}/recommendations", movie_id), Some(page))
            .await?;
        Ok(response.into())
    }
}

// Wire formats. Unknown fields are ignored.

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    status_message: String,
}

#[derive(Debug, Deserialize)]
struct MovieListResponse {
    #[serde(default = "first_page")]
    page: u32,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    results: Vec<MovieResponse>,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct MovieResponse {
    id: i64,
    title: String,
    poster_path: Option<String>,
    #[serde(default)]
    vote_average: f64,
    overview: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MovieDetailResponse {
    id: i64,
    title: String,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    release_date: Option<String>,
    runtime: Option<u32>,
    #[serde(default)]
    vote_average: f64,
    #[serde(default)]
    genres: Vec<GenreResponse>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenreResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct MovieCreditsResponse {
    #[serde(default)]
    cast: Vec<CastMemberResponse>,
    #[serde(default)]
    crew: Vec<CrewMemberResponse>,
}

#[derive(Debug, Deserialize)]
struct CastMemberResponse {
    id: i64,
    name: String,
    #[serde(default)]
    character: String,
    profile_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrewMemberResponse {
    id: i64,
    name: String,
    job: String,
    profile_path: Option<String>,
}

impl From<MovieResponse> for Movie {
    fn from(r: MovieResponse) -> Self {
        Movie {
            id: r.id,
            title: r.title,
            poster_path: r.poster_path.unwrap_or_default(),
            vote_average: r.vote_average,
            overview: r.overview.filter(|o| !o.is_empty()),
            bookmarked: false,
        }
    }
}

impl From<MovieListResponse> for MoviePage {
    fn from(r: MovieListResponse) -> Self {
        MoviePage {
            page: r.page,
            total_pages: r.total_pages,
            results: r.results.into_iter().map(Movie::from).collect(),
        }
    }
}

impl From<MovieDetailResponse> for MovieDetail {
    fn from(r: MovieDetailResponse) -> Self {
        MovieDetail {
            id: r.id,
            title: r.title,
            overview: r.overview.filter(|o| !o.is_empty()),
            poster_path: r.poster_path.unwrap_or_default(),
            backdrop_path: r.backdrop_path.unwrap_or_default(),
            release_date: r.release_date.filter(|d| !d.is_empty()),
            runtime: r.runtime,
            vote_average: r.vote_average,
            genres: r.genres.into_iter().map(|g| g.name).collect(),
            status: r
                .status
                .as_deref()
                .map(MovieStatus::from_original_name)
                .unwrap_or(MovieStatus::Released),
            bookmarked: false,
        }
    }
}

impl From<MovieCreditsResponse> for MovieCredits {
    fn from(r: MovieCreditsResponse) -> Self {
        let cast = r
            .cast
            .into_iter()
            .map(|c| CastMember {
                id: c.id,
                name: c.name,
                character: c.character,
                profile_path: c.profile_path.unwrap_or_default(),
            })
            .collect();
        let crew = r
            .crew
            .into_iter()
            .map(|c| CrewMember {
                id: c.id,
                job: c.job,
                name: c.name,
                profile_path: c.profile_path.unwrap_or_default(),
            })
            .collect();

        MovieCredits::from_members(cast, crew)
    }
}
