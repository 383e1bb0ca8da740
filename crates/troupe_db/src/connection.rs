//! Database connection management.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::error::DbResult;

/// Connection to a studio database.
///
/// One database file holds everything a studio owns: teams, their
/// sessions and runs, message transcripts, tools, settings, and
/// evaluation records.
#[derive(Debug, Clone)]
pub struct StudioDb {
    pool: SqlitePool,
}

impl StudioDb {
    /// Open or create a studio database at the given path.
    ///
    /// This will:
    /// 1. Create the database file if it doesn't exist
    /// 2. Run any pending migrations
    /// 3. Configure SQLite for optimal performance (WAL mode, etc.)
    pub async fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let path_str = path.to_string_lossy();
        info!("Opening studio database: {}", path_str);

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            // Recommended SQLite pragmas for performance
            .pragma("cache_size", "-64000") // 64MB cache
            .pragma("synchronous", "NORMAL") // Safe with WAL
            .pragma("temp_store", "MEMORY")
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(5) // SQLite is single-writer, but readers can parallelize
            .connect_with(options)
            .await?;

        debug!("Database connection established");

        // Run migrations
        Self::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Open an in-memory database (for testing).
    pub async fn open_in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(":memory:")
            .journal_mode(SqliteJournalMode::Wal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(1) // In-memory must be single connection to share state
            .connect_with(options)
            .await?;

        Self::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Run database migrations.
    async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
        debug!("Running database migrations");
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Check if the database is healthy.
    pub async fn health_check(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Get database statistics.
    pub async fn stats(&self) -> DbResult<DbStats> {
        let teams: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM teams")
            .fetch_one(&self.pool)
            .await?;

        let sessions: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions")
            .fetch_one(&self.pool)
            .await?;

        let runs: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM runs")
            .fetch_one(&self.pool)
            .await?;

        let messages: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(&self.pool)
            .await?;

        Ok(DbStats {
            team_count: teams.0 as u64,
            session_count: sessions.0 as u64,
            run_count: runs.0 as u64,
            message_count: messages.0 as u64,
        })
    }

    /// Vacuum the database to reclaim space.
    pub async fn vacuum(&self) -> DbResult<()> {
        info!("Vacuuming database");
        sqlx::query("VACUUM").execute(&self.pool).await?;
        Ok(())
    }

    /// Checkpoint the WAL file.
    pub async fn checkpoint(&self) -> DbResult<()> {
        debug!("Checkpointing WAL");
        sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Database statistics.
#[derive(Debug, Clone)]
pub struct DbStats {
    pub team_count: u64,
    pub session_count: u64,
    pub run_count: u64,
    pub message_count: u64,
}
