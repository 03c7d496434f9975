use chrono::{DateTime, Utc};
use sqlx::sqlite::{self, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::error::StoreError;

const SCHEMA: &str = include_str!("../../../sql/schema.sql");

/// Owned handle to the quote store. Cloning shares the same connection.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database, creating the file and the schema when missing.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let connect_err = |source: sqlx::Error| StoreError::Connect {
            url: url.to_string(),
            source,
        };

        let options = SqliteConnectOptions::from_str(url)
            .map_err(connect_err)?
            .create_if_missing(true)
            .journal_mode(sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30))
            .statement_cache_capacity(100);

        // A single connection that is never recycled, so in-memory databases
        // live as long as the handle.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(connect_err)?;

        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .map_err(StoreError::Schema)?;

        info!("Database ready at {}", url);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

pub(crate) fn to_epoch_secs(time: &DateTime<Utc>) -> f64 {
    time.timestamp_micros() as f64 / 1_000_000_f64
}

pub(crate) fn from_epoch_secs(secs: f64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_micros((secs * 1_000_000_f64).round() as i64)
}
