//! Database module for folder and track persistence.
//!
//! Uses SQLx with SQLite for lightweight, embedded database storage.
//! Provides async operations for:
//! - Collection folder management
//! - Track upserts, file-info refreshes and deletions
//! - The aggregates the staleness check relies on
//!
//! # Example
//!
//! ```ignore
//! use collection_indexer::db::{init_db, SqliteLibrary};
//!
//! let pool = init_db("sqlite:collection.db").await?;
//! let library = SqliteLibrary::new(pool);
//! let total = library.count_tracks().await?;
//! ```

use std::path::Path;

use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::model::{Folder, Track};
use crate::ticks;

/// Default database filename.
pub const DEFAULT_DB_NAME: &str = "collection.db";

/// Track columns, with non-integer `needs_indexing` values read as NULL.
const TRACK_COLUMNS: &str = r#"
    id, path, folder_id, file_name, file_size, date_file_modified, date_added,
    CASE WHEN typeof(needs_indexing) = 'integer' THEN needs_indexing ELSE NULL END
        AS needs_indexing
"#;

/// Build a SQLite database URL from an optional path.
///
/// If no path is provided, uses [`DEFAULT_DB_NAME`] in the current directory.
pub fn db_url(path: Option<&Path>) -> String {
    match path {
        Some(p) => format!("sqlite:{}", p.display()),
        None => format!("sqlite:{}", DEFAULT_DB_NAME),
    }
}

/// Initialize the database connection pool and run migrations.
///
/// Creates the database file if it doesn't exist, establishes a connection
/// pool with up to 5 connections, and runs all pending migrations.
///
/// # Errors
///
/// Returns an error if:
/// - Database creation fails
/// - Connection cannot be established
/// - Migration fails
pub async fn init_db(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    if !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
        tracing::info!(target: "db", url = db_url, "Creating database");
        sqlx::Sqlite::create_database(db_url).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// A track to insert, before it has a database ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrack {
    pub path: String,
    pub folder_id: Option<i64>,
    pub file_size: i64,
    pub date_file_modified: i64,
    pub needs_indexing: bool,
}

impl NewTrack {
    fn file_name(&self) -> String {
        Path::new(&self.path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// SQLite-backed folder and track store.
#[derive(Debug, Clone)]
pub struct SqliteLibrary {
    pool: SqlitePool,
}

impl SqliteLibrary {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating and migrating if needed) the database at `path`.
    pub async fn open(path: &Path) -> Result<Self, sqlx::Error> {
        let pool = init_db(&db_url(Some(path))).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ------------------------------------------------------------------------
    // Folders
    // ------------------------------------------------------------------------

    /// Add a collection folder. Adding an existing path returns its ID.
    pub async fn add_folder(&self, path: &str) -> sqlx::Result<i64> {
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO folders (path, show_in_collection)
            VALUES (?, 1)
            ON CONFLICT(path) DO UPDATE SET path = excluded.path
            RETURNING id
            "#,
        )
        .bind(path)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    /// Remove a collection folder. Its tracks stay until the next index pass.
    pub async fn remove_folder(&self, path: &str) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE path = ?")
            .bind(path)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn folders(&self) -> sqlx::Result<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT id, path, show_in_collection FROM folders ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
    }

    // ------------------------------------------------------------------------
    // Tracks
    // ------------------------------------------------------------------------

    /// Insert or update a track keyed by path.
    ///
    /// `date_added` is only set on first insert.
    pub async fn upsert_track(&self, track: &NewTrack) -> sqlx::Result<i64> {
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO tracks (
                path, folder_id, file_name, file_size,
                date_file_modified, date_added, needs_indexing
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(path) DO UPDATE SET
                folder_id = excluded.folder_id,
                file_name = excluded.file_name,
                file_size = excluded.file_size,
                date_file_modified = excluded.date_file_modified,
                needs_indexing = excluded.needs_indexing
            RETURNING id
            "#,
        )
        .bind(&track.path)
        .bind(track.folder_id)
        .bind(track.file_name())
        .bind(track.file_size)
        .bind(track.date_file_modified)
        .bind(ticks::now())
        .bind(track.needs_indexing as i64)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    /// Record the current on-disk size and mtime and clear the dirty flag.
    pub async fn update_track_file_info(
        &self,
        track_id: i64,
        file_size: i64,
        date_file_modified: i64,
    ) -> sqlx::Result<()> {
        sqlx::query(
            "UPDATE tracks SET file_size = ?, date_file_modified = ?, needs_indexing = 0 WHERE id = ?",
        )
        .bind(file_size)
        .bind(date_file_modified)
        .bind(track_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Mark a track dirty (or clean) independent of its file state.
    pub async fn set_needs_indexing(&self, track_id: i64, needs_indexing: bool) -> sqlx::Result<()> {
        sqlx::query("UPDATE tracks SET needs_indexing = ? WHERE id = ?")
            .bind(needs_indexing as i64)
            .bind(track_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_track_by_path(&self, path: &str) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM tracks WHERE path = ?")
            .bind(path)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn tracks(&self) -> sqlx::Result<Vec<Track>> {
        let sql = format!("SELECT {} FROM tracks ORDER BY path", TRACK_COLUMNS);
        sqlx::query_as::<_, Track>(&sql)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn track_by_path(&self, path: &str) -> sqlx::Result<Option<Track>> {
        let sql = format!("SELECT {} FROM tracks WHERE path = ?", TRACK_COLUMNS);
        sqlx::query_as::<_, Track>(&sql)
            .bind(path)
            .fetch_optional(&self.pool)
            .await
    }

    // ------------------------------------------------------------------------
    // Aggregates
    // ------------------------------------------------------------------------

    pub async fn count_tracks(&self) -> sqlx::Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tracks")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    pub async fn count_tracks_needing_indexing(&self) -> sqlx::Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tracks WHERE needs_indexing = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    pub async fn max_date_file_modified(&self) -> sqlx::Result<Option<i64>> {
        let row: (Option<i64>,) = sqlx::query_as("SELECT MAX(date_file_modified) FROM tracks")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}
