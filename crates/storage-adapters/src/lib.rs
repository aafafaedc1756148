//! # storage-adapters
//!
//! SQLite implementation of every repository port in `domains::traits`.
//!
//! A single [`SqliteStore`] owns the connection pool; each port lives in its
//! own module as an `impl` block on that struct. Multi-row writes (booking +
//! notification, status change + side effects, review + notification) run in
//! one transaction so they commit or roll back together.

mod availability;
mod bookings;
mod calendar;
mod notifications;
mod reviews;
mod rows;
mod services;
mod users;

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use domains::{round_rating, AppError, PlatformStats, Result, StatsRepo};

/// Handle to the marketplace database. Cheap to clone.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if missing) the database at `url` and applies migrations.
    ///
    /// In-memory databases live and die with their connection, so they are
    /// pinned to a single connection that is never recycled.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(internal)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options.connect_with(options).await.map_err(internal)?;
        Self::new(pool).await
    }

    /// Wraps an existing pool and brings its schema up to date.
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Internal(format!("migration failed: {e}")))?;
        info!("database schema is up to date");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl StatsRepo for SqliteStore {
    async fn platform_stats(&self) -> Result<PlatformStats> {
        let total_services: i64 = sqlx::query_scalar("SELECT COUNT(id) FROM services")
            .fetch_one(&self.pool)
            .await
            .map_err(internal)?;
        let total_providers: i64 =
            sqlx::query_scalar("SELECT COUNT(id) FROM users WHERE role = 'provider'")
                .fetch_one(&self.pool)
                .await
                .map_err(internal)?;
        let average: Option<f64> = sqlx::query_scalar("SELECT AVG(rating) FROM reviews")
            .fetch_one(&self.pool)
            .await
            .map_err(internal)?;

        Ok(PlatformStats {
            total_services,
            total_providers,
            avg_rating: average.map(round_rating).unwrap_or(0.0),
        })
    }
}

// ── Error mapping ───────────────────────────────────────────────────────────

pub(crate) fn internal(err: sqlx::Error) -> AppError {
    AppError::Internal(err.to_string())
}

/// Maps constraint violations on a write to client-facing errors:
/// unique violations become `Conflict(message)`, dangling references a
/// validation failure. Anything else is `Internal`.
pub(crate) fn write_error(message: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |err| match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(message.to_string())
        }
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            AppError::ValidationError("referenced record does not exist".into())
        }
        _ => internal(err),
    }
}
