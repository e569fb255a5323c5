//! mf-browse - Browse TMDB movie lists
//!
//! Renders the home sections, a single list page, a movie detail, or the
//! similar and recommended movies for a title.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use libmoviefinder::service::{MovieFinderService, SectionsState};
use libmoviefinder::types::{ImageSize, MovieDetailState, MoviePage};
use libmoviefinder::{Config, LoadState, Movie, MovieFinderError, MovieListType};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "mf-browse")]
#[command(version)]
#[command(about = "Browse TMDB movie lists")]
#[command(long_about = "\
mf-browse - Browse TMDB movie lists

COMMANDS:
    home        Show all four home sections
    list        Show one page of a list (now_playing, popular, top_rated, upcoming)
    detail      Show a movie with its director and top cast
    similar     Show movies similar to a movie
    recommend   Show movies recommended for a movie

USAGE EXAMPLES:
    mf-browse home
    mf-browse list top_rated --page 2
    mf-browse detail 533535
    mf-browse similar 533535 --format json | jq '.results[].title'

CONFIGURATION:
    Configuration file: ~/.config/moviefinder/config.toml
    Bookmark database:  ~/.local/share/moviefinder/bookmarks.db

    Override with environment variables:
        MOVIEFINDER_CONFIG      - Path to config file
        MOVIEFINDER_DB_PATH     - Path to bookmark database
        MOVIEFINDER_TMDB_TOKEN  - TMDB API read access token
        MOVIEFINDER_LOG_FORMAT  - text, json or pretty
        MOVIEFINDER_LOG_LEVEL   - error, warn, info, debug, trace

EXIT CODES:
    0 - Success (including a home screen with some failed sections)
    1 - Operation failed
    2 - Authentication error (missing or rejected access token)
    3 - Invalid input (bad list type, page number, etc.)
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
    /// Show every home section
    Home,

    /// Show one page of a list
    List {
        /// now_playing, popular, top_rated or upcoming
        list_type: String,

        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Show a movie's detail and credits
    Detail { movie_id: i64 },

    /// Show similar movies
    Similar {
        movie_id: i64,

        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Show recommended movies
    Recommend {
        movie_id: i64,

        #[arg(short, long, default_value = "1")]
        page: u32,
    },
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
        Commands::Home => cmd_home(&service, json).await,
        Commands::List { list_type, page } => {
            let list_type: MovieListType =
                list_type.parse().map_err(MovieFinderError::InvalidInput)?;
            let result = service.home().list_page(list_type, page).await?;
            output_page(list_type.label(), &result, json)
        }
        Commands::Detail { movie_id } => cmd_detail(&service, movie_id, json).await,
        Commands::Similar { movie_id, page } => {
            let result = service.detail().similar(movie_id, page).await?;
            output_page("Similar", &result, json)
        }
        Commands::Recommend { movie_id, page } => {
            let result = service.detail().recommended(movie_id, page).await?;
            output_page("Recommended", &result, json)
        }
    }
}

async fn cmd_home(service: &MovieFinderService, json: bool) -> Result<()> {
    let mut events = service.subscribe();

    let mut snapshots = Box::pin(service.home().watch_sections());
    let mut sections = SectionsState::loading();
    while let Some(snapshot) = snapshots.next().await {
        let done = snapshot.ordered().filter(|(_, s)| s.is_terminal()).count();
        tracing::debug!("{}/{} sections loaded", done, MovieListType::ALL.len());
        sections = snapshot;
    }

    while let Ok(event) = events.try_recv() {
        if let Some(message) = event.notification() {
            eprintln!("{}", message);
        }
    }

    if json {
        print_json(&sections)?;
    } else {
        output_sections_text(&sections);
    }

    if sections.succeeded().is_empty() {
        bail!("No section could be loaded");
    }

    Ok(())
}

async fn cmd_detail(service: &MovieFinderService, movie_id: i64, json: bool) -> Result<()> {
    let states: Vec<_> = service.detail().load(movie_id).collect().await;

    match states.last() {
        Some(LoadState::Success(state)) => {
            if json {
                print_json(state)?;
            } else {
                output_detail_text(state);
            }
            Ok(())
        }
        Some(LoadState::Error(error)) => bail!("{} ({})", error.user_message(), error),
        _ => bail!("Detail for movie {} did not finish loading", movie_id),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn output_sections_text(sections: &SectionsState) {
    for (list_type, state) in sections.ordered() {
        println!("== {} ==", list_type.label());
        match state {
            LoadState::Success(movies) => {
                for movie in movies {
                    println!("{}", format_movie(movie));
                }
            }
            LoadState::Error(error) => println!("  ! {}", error.user_message()),
            LoadState::Loading => println!("  ..."),
        }
        println!();
    }
}

fn output_page(heading: &str, page: &MoviePage, json: bool) -> Result<()> {
    if json {
        return print_json(page);
    }

    println!("== {} (page {}/{}) ==", heading, page.page, page.total_pages);
    for movie in &page.results {
        println!("{}", format_movie(movie));
    }
    Ok(())
}

fn output_detail_text(state: &MovieDetailState) {
    let detail = &state.detail;
    let marker = if detail.bookmarked { "★" } else { "☆" };

    println!("{} {} [{}]", marker, detail.title, detail.id);
    if let Some(ref date) = detail.release_date {
        println!("Released:  {} ({})", date, detail.status.original_name());
    }
    if let Some(runtime) = detail.runtime {
        println!("Runtime:   {}h {}m", runtime / 60, runtime % 60);
    }
    println!("Rating:    {:.1}", detail.vote_average);
    if !detail.genres.is_empty() {
        println!("Genres:    {}", detail.genres.join(", "));
    }
    if let Some(url) = libmoviefinder::types::image_url(&detail.poster_path, ImageSize::W500) {
        println!("Poster:    {}", url);
    }
    if let Some(ref director) = state.credits.director {
        println!("Director:  {}", director.name);
    }
    if !state.credits.cast.is_empty() {
        println!("Cast:");
        for member in &state.credits.cast {
            println!("  {} as {}", member.name, member.character);
        }
    }
    if let Some(ref overview) = detail.overview {
        println!();
        println!("{}", overview);
    }
}

fn format_movie(movie: &Movie) -> String {
    let marker = if movie.bookmarked { "★" } else { " " };
    format!("{} {:>8} | {:>4.1} | {}", marker, movie.id, movie.vote_average, movie.title)
}
