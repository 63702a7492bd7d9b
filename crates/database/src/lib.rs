//! SQLite persistence layer for the video generation service.
//!
//! This crate provides async database operations for users, the coin ledger,
//! generation jobs and products using SQLx with SQLite.
//!
//! The two correctness-critical pieces live here:
//!
//! - [`ledger::debit`] guards the balance with a conditional UPDATE so
//!   concurrent debits for one user can never jointly overdraw.
//! - [`job::fail_and_refund`] / [`job::complete`] flip a job's terminal state
//!   with a conditional UPDATE inside one transaction, so duplicate poll and
//!   webhook signals are no-ops and a failed job is refunded exactly once.
//!
//! # Example
//!
//! ```no_run
//! use database::{user, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:service.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Provision a user with the welcome bonus
//!     let user = user::ensure_user(db.pool(), "auth0|abc", "Bob").await?;
//!     println!("balance: {}", user.balance);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod job;
pub mod ledger;
pub mod models;
pub mod product;
pub mod user;

pub use error::{DatabaseError, Result};
pub use models::{GenerationJob, JobState, LedgerEntry, LedgerKind, Product, User};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// Sized for concurrent submissions, polls and webhook deliveries.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `sqlite::memory:` for tests.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!("Connected to database: {} (pool size: {})", url, pool_size);

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
