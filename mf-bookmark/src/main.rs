//! mf-bookmark - Manage local movie bookmarks
//!
//! Bookmarks live in a local SQLite database and work without network
//! access. Toggling a movie that is not yet bookmarked needs either a
//! `--title` or a configured TMDB token to look the movie up.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use libmoviefinder::service::MovieFinderService;
use libmoviefinder::{Config, Movie, MovieFinderError};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "mf-bookmark")]
#[command(version)]
#[command(about = "Manage local movie bookmarks")]
#[command(long_about = "\
mf-bookmark - Manage local movie bookmarks

COMMANDS:
    list        List bookmarked movies, newest first
    toggle      Bookmark a movie, or remove its bookmark
    status      Show whether a movie is bookmarked

USAGE EXAMPLES:
    mf-bookmark list
    mf-bookmark list --format json | jq '.[].title'
    mf-bookmark toggle 533535
    mf-bookmark toggle 278 --title \"The Shawshank Redemption\"
    mf-bookmark status 278

CONFIGURATION:
    Configuration file: ~/.config/moviefinder/config.toml
    Bookmark database:  ~/.local/share/moviefinder/bookmarks.db

    Override with environment variables:
        MOVIEFINDER_CONFIG      - Path to config file
        MOVIEFINDER_DB_PATH     - Path to bookmark database
        MOVIEFINDER_TMDB_TOKEN  - TMDB API read access token

EXIT CODES:
    0 - Success (including an empty bookmark list)
    1 - Operation failed
    2 - Authentication error (lookup needed but no usable token)
    3 - Invalid input
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    #[arg(value_parser = ["text", "json"])]
    format: String,

    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List bookmarked movies
    List {
        #[arg(short, long, default_value = "50")]
        limit: usize,

        #[arg(long, default_value = "0")]
        offset: usize,
    },

    /// Toggle a movie's bookmark
    Toggle {
        movie_id: i64,

        /// Title to store; skips the remote lookup
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Show whether a movie is bookmarked
    Status { movie_id: i64 },
}

/// Result of a toggle or status query
#[derive(Debug, Serialize)]
struct BookmarkStatus {
    movie_id: i64,
    bookmarked: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    libmoviefinder::logging::init_default(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<MovieFinderError>()
        .map(MovieFinderError::exit_code)
        .unwrap_or(1)
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_or_default()?;
    let service = MovieFinderService::offline(config)
        .await
        .context("Failed to open bookmark database")?;

    let json = cli.format == "json";

    match cli.command {
        Commands::List { limit, offset } => {
            let movies = service.bookmarks().list(limit, offset).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&movies)?);
            } else {
                for movie in &movies {
                    println!("{} | {:>4.1} | {}", movie.id, movie.vote_average, movie.title);
                }
            }
        }
        Commands::Toggle { movie_id, title } => {
            check_movie_id(movie_id)?;
            let movie = resolve_movie(&service, movie_id, title).await?;
            let bookmarked = service.bookmarks().toggle(&movie).await?;
            output_status(&BookmarkStatus { movie_id, bookmarked }, json)?;
        }
        Commands::Status { movie_id } => {
            check_movie_id(movie_id)?;
            let bookmarked = service.bookmarks().is_bookmarked(movie_id).await?;
            output_status(&BookmarkStatus { movie_id, bookmarked }, json)?;
        }
    }

    Ok(())
}

fn check_movie_id(movie_id: i64) -> libmoviefinder::Result<()> {
    if movie_id <= 0 {
        return Err(MovieFinderError::InvalidInput(format!(
            "Invalid movie id: {}",
            movie_id
        )));
    }
    Ok(())
}

/// The movie to toggle.
///
/// Removing a bookmark only needs the id. Adding one stores the title and
/// poster, taken from `--title` or from a remote detail lookup.
async fn resolve_movie(
    service: &MovieFinderService,
    movie_id: i64,
    title: Option<String>,
) -> Result<Movie> {
    if let Some(title) = title {
        return Ok(Movie::new(movie_id, title));
    }

    if service.bookmarks().is_bookmarked(movie_id).await? {
        return Ok(Movie::new(movie_id, String::new()));
    }

    tracing::debug!("Looking up movie {} before bookmarking", movie_id);
    let state = service.detail().fetch(movie_id).await.with_context(|| {
        format!(
            "Could not look up movie {}. Pass --title to bookmark it offline",
            movie_id
        )
    })?;
    Ok(state.detail.as_movie())
}

fn output_status(status: &BookmarkStatus, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(status)?);
    } else if status.bookmarked {
        println!("{} bookmarked", status.movie_id);
    } else {
        println!("{} not bookmarked", status.movie_id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_movie_id() {
        assert!(check_movie_id(533535).is_ok());
        assert_eq!(check_movie_id(0).unwrap_err().exit_code(), 3);
        assert_eq!(check_movie_id(-4).unwrap_err().exit_code(), 3);
    }

    #[test]
    fn test_cli_parses_toggle_with_title() {
        let cli = Cli::try_parse_from([
            "mf-bookmark",
            "toggle",
            "278",
            "--title",
            "The Shawshank Redemption",
        ])
        .unwrap();
        match cli.command {
            Commands::Toggle { movie_id, title } => {
                assert_eq!(movie_id, 278);
                assert_eq!(title.as_deref(), Some("The Shawshank Redemption"));
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_lookup_failure_keeps_auth_exit_code() {
        let auth: libmoviefinder::Result<()> = Err(MovieFinderError::Api(
            libmoviefinder::error::ApiError::Authentication("no token".to_string()),
        ));
        let err = auth.context("Could not look up movie 1").unwrap_err();
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn test_status_json_shape() {
        let status = BookmarkStatus {
            movie_id: 278,
            bookmarked: true,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["movie_id"], 278);
        assert_eq!(json["bookmarked"], true);
    }
}
