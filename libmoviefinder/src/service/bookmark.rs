//! Bookmark overlay and toggling
//!
//! Movies coming from a [`crate::source::MovieSource`] never carry bookmark
//! state. This service joins the local bookmark set into them at read time,
//! producing new values rather than mutating cached ones.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use super::events::{Event, EventBus};
use crate::types::{Movie, MovieDetail};
use crate::{Database, Result};

/// Bookmark service
///
/// Reads go straight to the store; toggles are serialized and announced as
/// [`Event::BookmarkToggled`].
#[derive(Clone)]
pub struct BookmarkService {
    db: Arc<Database>,
    event_bus: EventBus,
    // Serializes read-modify-write toggles across clones
    write_lock: Arc<Mutex<()>>,
}

/// Apply a known bookmark set to movies
pub fn overlay_with(movies: &[Movie], bookmarks: &HashSet<i64>) -> Vec<Movie> {
    movies
        .iter()
        .map(|m| m.with_bookmarked(bookmarks.contains(&m.id)))
        .collect()
}

impl BookmarkService {
    pub fn new(db: Arc<Database>, event_bus: EventBus) -> Self {
        Self {
            db,
            event_bus,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Copies of `movies` with `bookmarked` equal to current membership
    pub async fn overlay(&self, movies: &[Movie]) -> Result<Vec<Movie>> {
        let bookmarks = self.db.bookmarked_ids().await?;
        Ok(overlay_with(movies, &bookmarks))
    }

    pub async fn overlay_one(&self, movie: &Movie) -> Result<Movie> {
        let bookmarked = self.db.is_bookmarked(movie.id).await?;
        Ok(movie.with_bookmarked(bookmarked))
    }

    pub async fn overlay_detail(&self, detail: MovieDetail) -> Result<MovieDetail> {
        let bookmarked = self.db.is_bookmarked(detail.id).await?;
        Ok(MovieDetail { bookmarked, ..detail })
    }

    /// Invert membership of `movie` and return the new flag.
    ///
    /// The flag passed in on `movie` is ignored; the store is authoritative.
    pub async fn toggle(&self, movie: &Movie) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let bookmarked = self.db.toggle_bookmark(movie).await?;
        info!(
            "Bookmark {} for movie {} ({})",
            if bookmarked { "added" } else { "removed" },
            movie.id,
            movie.title
        );

        self.event_bus.emit(Event::BookmarkToggled {
            movie_id: movie.id,
            bookmarked,
        });

        Ok(bookmarked)
    }

    pub async fn is_bookmarked(&self, movie_id: i64) -> Result<bool> {
        self.db.is_bookmarked(movie_id).await
    }

    pub async fn bookmarked_ids(&self) -> Result<HashSet<i64>> {
        self.db.bookmarked_ids().await
    }

    /// Bookmarked movies, newest first, flagged as bookmarked
    pub async fn list(&self, limit: usize, offset: usize) -> Result<Vec<Movie>> {
        let bookmarks = self.db.list_bookmarks(limit, offset).await?;
        Ok(bookmarks.iter().map(|b| b.to_movie()).collect())
    }

    pub async fn count(&self) -> Result<usize> {
        self.db.count_bookmarks().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup() -> (BookmarkService, EventBus, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Database::new(db_path.to_str().unwrap()).await.unwrap();
        let event_bus = EventBus::new(100);
        let service = BookmarkService::new(Arc::new(db), event_bus.clone());
        (service, event_bus, temp_dir)
    }

    fn movie(id: i64) -> Movie {
        Movie::new(id, format!("Movie {}", id))
    }

    #[tokio::test]
    async fn test_toggle_then_overlay() {
        let (service, _bus, _temp_dir) = setup().await;
        let fetched = movie(533535);

        assert!(service.toggle(&fetched).await.unwrap());
        let overlaid = service.overlay_one(&fetched).await.unwrap();
        assert!(overlaid.bookmarked);
        assert!(!fetched.bookmarked);

        assert!(!service.toggle(&fetched).await.unwrap());
        let overlaid = service.overlay_one(&fetched).await.unwrap();
        assert!(!overlaid.bookmarked);
    }

    #[tokio::test]
    async fn test_overlay_preserves_order() {
        let (service, _bus, _temp_dir) = setup().await;
        service.toggle(&movie(2)).await.unwrap();

        let movies = vec![movie(3), movie(2), movie(1)];
        let overlaid = service.overlay(&movies).await.unwrap();

        let ids: Vec<_> = overlaid.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        let flags: Vec<_> = overlaid.iter().map(|m| m.bookmarked).collect();
        assert_eq!(flags, vec![false, true, false]);
    }

    #[tokio::test]
    async fn test_overlay_clears_stale_flag() {
        let (service, _bus, _temp_dir) = setup().await;
        let stale = movie(9).with_bookmarked(true);

        let overlaid = service.overlay_one(&stale).await.unwrap();
        assert!(!overlaid.bookmarked);
    }

    #[tokio::test]
    async fn test_toggle_emits_event() {
        let (service, bus, _temp_dir) = setup().await;
        let mut receiver = bus.subscribe();

        service.toggle(&movie(5)).await.unwrap();

        assert_eq!(
            receiver.recv().await.unwrap(),
            Event::BookmarkToggled {
                movie_id: 5,
                bookmarked: true
            }
        );
    }

    #[tokio::test]
    async fn test_concurrent_toggles_do_not_lose_updates() {
        let (service, _bus, _temp_dir) = setup().await;

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.toggle(&movie(77)).await.unwrap() })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        // Ten inversions end where they started
        assert!(!service.is_bookmarked(77).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_marks_bookmarked() {
        let (service, _bus, _temp_dir) = setup().await;
        service.toggle(&movie(1)).await.unwrap();
        service.toggle(&movie(2)).await.unwrap();

        let listed = service.list(10, 0).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|m| m.bookmarked));
        assert_eq!(service.count().await.unwrap(), 2);
    }

    #[test]
    fn test_overlay_with_set() {
        let movies = vec![movie(1), movie(2)];
        let overlaid = overlay_with(&movies, &HashSet::from([1]));
        assert!(overlaid[0].bookmarked);
        assert!(!overlaid[1].bookmarked);
    }
}
