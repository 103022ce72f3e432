use prodigal_core::ProdigalResult;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::db_error;

#[derive(Clone)]
pub struct ProdigalDb {
    pool: SqlitePool,
}

impl ProdigalDb {
    /// Create a new database connection and apply the schema
    pub async fn new(database_url: &str) -> ProdigalResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(db_error)?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(db_error)?;

        let db = Self { pool };
        db.init_schema().await?;

        tracing::info!("Database ready at {}", database_url);
        Ok(db)
    }

    /// Private in-memory database. Every connection to `sqlite::memory:` is its
    /// own database, so the pool is pinned to a single long-lived connection.
    pub async fn in_memory() -> ProdigalResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(db_error)?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(db_error)?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// Initialize database schema
    async fn init_schema(&self) -> ProdigalResult<()> {
        let schema = include_str!("../../../schema.sql");

        // Execute schema (split by statement since sqlx doesn't support multiple statements)
        for statement in schema.split(';') {
            let stmt = statement.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt)
                    .execute(&self.pool)
                    .await
                    .map_err(db_error)?;
            }
        }

        Ok(())
    }

    /// Get the database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check if database file exists
    pub fn exists(path: &str) -> bool {
        // Remove "sqlite:" prefix if present
        let file_path = path.strip_prefix("sqlite:").unwrap_or(path);
        Path::new(file_path).exists()
    }
}
