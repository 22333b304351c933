//! Shelf Storage
//!
//! `SQLite` persistence for Shelf users and book recommendations.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: `users` and `books` each own their queries
//! - **Atomic Ownership**: book updates and deletes check the owner in the
//!   same statement that writes
//! - **Embedded Migrations**: the schema ships inside the binary
//!
//! # Example
//!
//! ```rust,no_run
//! use shelf_storage::{create_pool, run_migrations, SqliteStore};
//! use shelf_core::storage::BookStore;
//! use shelf_core::types::PageRequest;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://shelf.db").await?;
//! run_migrations(&pool).await?;
//!
//! let store = SqliteStore::new(pool);
//! let (books, total) = store.list_books(PageRequest::default()).await?;
//! println!("{} of {} books", books.len(), total);
//! # Ok(())
//! # }
//! ```

mod context;
mod error;

// Vertical slices
pub mod books;
pub mod users;

pub use context::SqliteStore;
pub use error::StorageError;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool, creating the database file and any missing
/// parent directories
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://shelf.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(url = %database_url, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(30));

    // `create_if_missing` makes the file, not the directories above it
    if let Some(parent) = options.get_filename().parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::info!("SQLite pool ready");

    Ok(pool)
}
