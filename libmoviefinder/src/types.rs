//! Core types for MovieFinder

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Base URL for TMDB poster and profile images
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/";

/// A movie as shown in lists.
///
/// Values are produced per fetch and never mutated in place; the bookmark
/// flag is computed by [`crate::service::bookmark::BookmarkService::overlay`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub poster_path: String,
    pub vote_average: f64,
    pub overview: Option<String>,
    #[serde(default)]
    pub bookmarked: bool,
}

impl Movie {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            poster_path: String::new(),
            vote_average: 0.0,
            overview: None,
            bookmarked: false,
        }
    }

    /// Copy of this movie with the given bookmark flag
    pub fn with_bookmarked(&self, bookmarked: bool) -> Self {
        Self {
            bookmarked,
            ..self.clone()
        }
    }

    pub fn poster_url(&self, size: ImageSize) -> Option<String> {
        image_url(&self.poster_path, size)
    }
}

/// Build a full image URL from a TMDB file path
pub fn image_url(path: &str, size: ImageSize) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    Some(format!("{}{}{}", IMAGE_BASE_URL, size, path))
}

/// Image widths served by the TMDB image CDN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageSize {
    W92,
    W154,
    W185,
    W200,
    W342,
    W500,
    W780,
    Original,
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ImageSize::W92 => "w92",
            ImageSize::W154 => "w154",
            ImageSize::W185 => "w185",
            ImageSize::W200 => "w200",
            ImageSize::W342 => "w342",
            ImageSize::W500 => "w500",
            ImageSize::W780 => "w780",
            ImageSize::Original => "original",
        };
        write!(f, "{}", s)
    }
}

/// Movie list categories, in home screen display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovieListType {
    NowPlaying,
    Popular,
    TopRated,
    Upcoming,
}

impl MovieListType {
    pub const ALL: [MovieListType; 4] = [
        MovieListType::NowPlaying,
        MovieListType::Popular,
        MovieListType::TopRated,
        MovieListType::Upcoming,
    ];

    /// Path segment used by the remote API
    pub fn as_path(&self) -> &'static str {
        match self {
            MovieListType::NowPlaying => "now_playing",
            MovieListType::Popular => "popular",
            MovieListType::TopRated => "top_rated",
            MovieListType::Upcoming => "upcoming",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MovieListType::NowPlaying => "Now Playing",
            MovieListType::Popular => "Popular",
            MovieListType::TopRated => "Top Rated",
            MovieListType::Upcoming => "Upcoming",
        }
    }
}

impl FromStr for MovieListType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "now_playing" => Ok(MovieListType::NowPlaying),
            "popular" => Ok(MovieListType::Popular),
            "top_rated" => Ok(MovieListType::TopRated),
            "upcoming" => Ok(MovieListType::Upcoming),
            _ => Err(format!(
                "Invalid list type: '{}'. Valid options: now_playing, popular, top_rated, upcoming",
                s
            )),
        }
    }
}

impl fmt::Display for MovieListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_path())
    }
}

/// One page of a movie list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoviePage {
    pub page: u32,
    pub total_pages: u32,
    pub results: Vec<Movie>,
}

impl MoviePage {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Release state of a movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovieStatus {
    Released,
    ComingSoon,
}

impl MovieStatus {
    pub fn original_name(&self) -> &'static str {
        match self {
            MovieStatus::Released => "Released",
            MovieStatus::ComingSoon => "ComingSoon",
        }
    }

    /// Look up a status by its remote name; unknown names are `Released`
    pub fn from_original_name(name: &str) -> Self {
        [MovieStatus::Released, MovieStatus::ComingSoon]
            .into_iter()
            .find(|s| s.original_name().eq_ignore_ascii_case(name))
            .unwrap_or(MovieStatus::Released)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: i64,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: String,
    pub backdrop_path: String,
    pub release_date: Option<String>,
    /// Minutes
    pub runtime: Option<u32>,
    pub vote_average: f64,
    pub genres: Vec<String>,
    pub status: MovieStatus,
    #[serde(default)]
    pub bookmarked: bool,
}

impl MovieDetail {
    /// The list-shaped view of this movie, used for bookmarking from detail
    pub fn as_movie(&self) -> Movie {
        Movie {
            id: self.id,
            title: self.title.clone(),
            poster_path: self.poster_path.clone(),
            vote_average: self.vote_average,
            overview: self.overview.clone(),
            bookmarked: self.bookmarked,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: i64,
    pub name: String,
    pub character: String,
    pub profile_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: i64,
    pub job: String,
    pub name: String,
    pub profile_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieCredits {
    pub director: Option<CrewMember>,
    pub cast: Vec<CastMember>,
}

/// Number of cast members kept in [`MovieCredits`]
pub const TOP_CAST_COUNT: usize = 5;

impl MovieCredits {
    pub fn from_members(cast: Vec<CastMember>, crew: Vec<CrewMember>) -> Self {
        Self {
            director: crew.into_iter().find(|member| member.job == "Director"),
            cast: cast.into_iter().take(TOP_CAST_COUNT).collect(),
        }
    }
}

/// Detail screen payload: detail and credits loaded together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetailState {
    pub detail: MovieDetail,
    pub credits: MovieCredits,
}

/// A bookmarked movie as stored locally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub movie_id: i64,
    pub title: String,
    pub poster_path: String,
    pub vote_average: f64,
    pub created_at: i64,
}

impl Bookmark {
    pub fn from_movie(movie: &Movie) -> Self {
        Self {
            movie_id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
            vote_average: movie.vote_average,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn to_movie(&self) -> Movie {
        Movie {
            id: self.movie_id,
            title: self.title.clone(),
            poster_path: self.poster_path.clone(),
            vote_average: self.vote_average,
            overview: None,
            bookmarked: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_type_order_and_paths() {
        let paths: Vec<_> = MovieListType::ALL.iter().map(|t| t.as_path()).collect();
        assert_eq!(paths, vec!["now_playing", "popular", "top_rated", "upcoming"]);
    }

    #[test]
    fn test_list_type_from_str() {
        assert_eq!("popular".parse::<MovieListType>().unwrap(), MovieListType::Popular);
        assert_eq!("TOP_RATED".parse::<MovieListType>().unwrap(), MovieListType::TopRated);
        assert_eq!("now-playing".parse::<MovieListType>().unwrap(), MovieListType::NowPlaying);

        let err = "trending".parse::<MovieListType>().unwrap_err();
        assert!(err.contains("Invalid list type: 'trending'"));
    }

    #[test]
    fn test_poster_url() {
        let mut movie = Movie::new(533535, "Deadpool & Wolverine");
        assert_eq!(movie.poster_url(ImageSize::W200), None);

        movie.poster_path = "/8cdWjvZQUExUUTzyp4t6EDMubfO.jpg".to_string();
        assert_eq!(
            movie.poster_url(ImageSize::W200).unwrap(),
            "https://image.tmdb.org/t/p/w200/8cdWjvZQUExUUTzyp4t6EDMubfO.jpg"
        );
    }

    #[test]
    fn test_movie_status_lookup() {
        assert_eq!(MovieStatus::from_original_name("Released"), MovieStatus::Released);
        assert_eq!(MovieStatus::from_original_name("comingsoon"), MovieStatus::ComingSoon);
        assert_eq!(MovieStatus::from_original_name("Post Production"), MovieStatus::Released);
    }

    #[test]
    fn test_credits_pick_director_and_top_cast() {
        let cast = (0..8)
            .map(|i| CastMember {
                id: i,
                name: format!("Actor {}", i),
                character: format!("Role {}", i),
                profile_path: String::new(),
            })
            .collect();
        let crew = vec![
            CrewMember {
                id: 100,
                job: "Producer".to_string(),
                name: "Producer".to_string(),
                profile_path: String::new(),
            },
            CrewMember {
                id: 101,
                job: "Director".to_string(),
                name: "Shawn Levy".to_string(),
                profile_path: String::new(),
            },
        ];

        let credits = MovieCredits::from_members(cast, crew);
        assert_eq!(credits.director.unwrap().name, "Shawn Levy");
        assert_eq!(credits.cast.len(), TOP_CAST_COUNT);
        assert_eq!(credits.cast[0].id, 0);
        assert_eq!(credits.cast[4].id, 4);
    }

    #[test]
    fn test_page_has_next() {
        let page = MoviePage {
            page: 1,
            total_pages: 3,
            results: vec![],
        };
        assert!(page.has_next());

        let last = MoviePage { page: 3, ..page };
        assert!(!last.has_next());
    }

    #[test]
    fn test_with_bookmarked_leaves_original_untouched() {
        let movie = Movie::new(1, "Alien");
        let marked = movie.with_bookmarked(true);
        assert!(marked.bookmarked);
        assert!(!movie.bookmarked);
    }
}
