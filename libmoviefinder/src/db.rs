//! Bookmark store backed by SQLite

use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::collections::HashSet;
use std::path::Path;

use crate::error::{DbError, Result};
use crate::types::{Bookmark, Movie};

/// Local bookmark store
///
/// One row per bookmarked movie, with enough of the movie to render the
/// bookmark list offline. Cloning shares the connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database and run migrations
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the SQLite file; `~` is expanded and missing
    ///   parent directories are created
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the file cannot
    /// be opened, or a migration fails.
    pub async fn new(db_path: &str) -> Result<Self> {
        let expanded_path = shellexpand::tilde(db_path).to_string();
        let path = Path::new(&expanded_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(DbError::IoError)?;
        }

        // Forward slashes work on both Windows and Unix; mode=rwc creates the file
        let db_url = format!("sqlite://{}?mode=rwc", expanded_path.replace('\\', "/"));

        let pool = SqlitePool::connect(&db_url)
            .await
            .map_err(DbError::SqlxError)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(DbError::MigrationError)?;

        Ok(Self { pool })
    }

    /// Whether `movie_id` is in the bookmark set
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn is_bookmarked(&self, movie_id: i64) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM bookmarks WHERE movie_id = ?")
            .bind(movie_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(row.is_some())
    }

    /// The full bookmark set
    pub async fn bookmarked_ids(&self) -> Result<HashSet<i64>> {
        let rows = sqlx::query("SELECT movie_id FROM bookmarks")
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(rows.iter().map(|r| r.get::<i64, _>("movie_id")).collect())
    }

    /// Insert a bookmark; an existing one for the same movie is kept as is
    pub async fn add_bookmark(&self, bookmark: &Bookmark) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO bookmarks (movie_id, title, poster_path, vote_average, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(movie_id) DO NOTHING
            "#,
        )
        .bind(bookmark.movie_id)
        .bind(&bookmark.title)
        .bind(&bookmark.poster_path)
        .bind(bookmark.vote_average)
        .bind(bookmark.created_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(())
    }

    /// Returns true if a bookmark was removed
    pub async fn remove_bookmark(&self, movie_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE movie_id = ?")
            .bind(movie_id)
            .execute(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(result.rows_affected() > 0)
    }

    /// Invert membership of `movie` in one transaction.
    ///
    /// Returns the new membership.
    pub async fn toggle_bookmark(&self, movie: &Movie) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(DbError::SqlxError)?;

        let existing = sqlx::query("SELECT 1 FROM bookmarks WHERE movie_id = ?")
            .bind(movie.id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(DbError::SqlxError)?;

        let bookmarked = if existing.is_some() {
            sqlx::query("DELETE FROM bookmarks WHERE movie_id = ?")
                .bind(movie.id)
                .execute(&mut *tx)
                .await
                .map_err(DbError::SqlxError)?;
            false
        } else {
            let bookmark = Bookmark::from_movie(movie);
            sqlx::query(
                r#"
                INSERT INTO bookmarks (movie_id, title, poster_path, vote_average, created_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(bookmark.movie_id)
            .bind(&bookmark.title)
            .bind(&bookmark.poster_path)
            .bind(bookmark.vote_average)
            .bind(bookmark.created_at)
            .execute(&mut *tx)
            .await
            .map_err(DbError::SqlxError)?;
            true
        };

        tx.commit().await.map_err(DbError::SqlxError)?;

        Ok(bookmarked)
    }

    /// Bookmarks, newest first
    ///
    /// # Arguments
    ///
    /// * `limit` - Maximum number of bookmarks to return
    /// * `offset` - Number of bookmarks to skip, for paging
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_bookmarks(&self, limit: usize, offset: usize) -> Result<Vec<Bookmark>> {
        let rows = sqlx::query(
            r#"
            SELECT movie_id, title, poster_path, vote_average, created_at
            FROM bookmarks
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(rows
            .iter()
            .map(|r| Bookmark {
                movie_id: r.get("movie_id"),
                title: r.get("title"),
                poster_path: r.get("poster_path"),
                vote_average: r.get("vote_average"),
                created_at: r.get("created_at"),
            })
            .collect())
    }

    pub async fn count_bookmarks(&self) -> Result<usize> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM bookmarks")
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(row.get::<i64, _>("count") as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MovieFinderError;
    use tempfile::TempDir;

    async fn setup_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Database::new(db_path.to_str().unwrap()).await.unwrap();
        (db, temp_dir)
    }

    fn movie(id: i64, title: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            poster_path: format!("/{}.jpg", id),
            vote_average: 7.5,
            overview: None,
            bookmarked: false,
        }
    }

    #[tokio::test]
    async fn test_database_initialization_with_invalid_path() {
        #[cfg(unix)]
        let invalid_path = "/tmp/test\0invalid.db";

        #[cfg(windows)]
        let invalid_path = "C:\\invalid<>path\\test.db";

        let result = Database::new(invalid_path).await;
        assert!(matches!(result, Err(MovieFinderError::Database(_))));
    }

    #[tokio::test]
    async fn test_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("dir").join("test.db");
        Database::new(db_path.to_str().unwrap()).await.unwrap();
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_toggle_is_an_involution() {
        let (db, _temp_dir) = setup_db().await;
        let m = movie(533535, "Deadpool & Wolverine");

        assert!(!db.is_bookmarked(m.id).await.unwrap());
        assert!(db.toggle_bookmark(&m).await.unwrap());
        assert!(db.is_bookmarked(m.id).await.unwrap());
        assert!(!db.toggle_bookmark(&m).await.unwrap());
        assert!(!db.is_bookmarked(m.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_bookmarked_ids() {
        let (db, _temp_dir) = setup_db().await;
        db.toggle_bookmark(&movie(1, "One")).await.unwrap();
        db.toggle_bookmark(&movie(2, "Two")).await.unwrap();

        let ids = db.bookmarked_ids().await.unwrap();
        assert_eq!(ids, HashSet::from([1, 2]));
    }

    #[tokio::test]
    async fn test_add_bookmark_is_idempotent() {
        let (db, _temp_dir) = setup_db().await;
        let bookmark = Bookmark::from_movie(&movie(7, "Seven"));

        db.add_bookmark(&bookmark).await.unwrap();
        db.add_bookmark(&bookmark).await.unwrap();
        assert_eq!(db.count_bookmarks().await.unwrap(), 1);

        assert!(db.remove_bookmark(7).await.unwrap());
        assert!(!db.remove_bookmark(7).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_bookmarks_newest_first() {
        let (db, _temp_dir) = setup_db().await;
        for (id, created_at) in [(1, 100), (2, 300), (3, 200)] {
            let mut bookmark = Bookmark::from_movie(&movie(id, "m"));
            bookmark.created_at = created_at;
            db.add_bookmark(&bookmark).await.unwrap();
        }

        let ids: Vec<_> = db
            .list_bookmarks(10, 0)
            .await
            .unwrap()
            .iter()
            .map(|b| b.movie_id)
            .collect();
        assert_eq!(ids, vec![2, 3, 1]);

        let page = db.list_bookmarks(1, 1).await.unwrap();
        assert_eq!(page[0].movie_id, 3);
    }

    #[tokio::test]
    async fn test_same_second_bookmarks_keep_insertion_order() {
        let (db, _temp_dir) = setup_db().await;
        for id in [278, 238] {
            let mut bookmark = Bookmark::from_movie(&movie(id, "m"));
            bookmark.created_at = 1_000;
            db.add_bookmark(&bookmark).await.unwrap();
        }

        let bookmarks = db.list_bookmarks(10, 0).await.unwrap();
        assert_eq!(bookmarks[0].movie_id, 238);
        assert_eq!(bookmarks[1].movie_id, 278);
    }

    #[tokio::test]
    async fn test_bookmarks_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        {
            let db = Database::new(db_path.to_str().unwrap()).await.unwrap();
            db.toggle_bookmark(&movie(42, "Answer")).await.unwrap();
        }

        let db = Database::new(db_path.to_str().unwrap()).await.unwrap();
        assert!(db.is_bookmarked(42).await.unwrap());
        let bookmarks = db.list_bookmarks(10, 0).await.unwrap();
        assert_eq!(bookmarks[0].title, "Answer");
        assert_eq!(bookmarks[0].poster_path, "/42.jpg");
    }
}
