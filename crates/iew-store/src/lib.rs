//! IEW Store - DAO implementations
//!
//! Two adapters for the persistence ports of `iew-core`:
//! - **SQLite** - relational DAOs on a `sqlx` pool with an embedded
//!   schema and a query-level result cache
//! - **Mock** - in-memory DAOs for tests, same contracts, no query engine
//!
//! ## Key Components
//!
//! - [`DatabasePool`] - Connection pool with migration support
//! - [`SqliteStore`] - Hands out the per-entity SQLite DAOs
//! - [`SqliteDomainModelDao`] - Generic SQLite DAO over any [`SqlEntity`]
//! - [`QueryCache`] - Cache for finder results, invalidated per table
//! - [`mock::MockDomainModelDao`] - Generic in-memory DAO
//! - [`StoreError`] - Error types for store operations
//!
//! ## Usage
//!
//! ```no_run
//! use iew_core::domain::Account;
//! use iew_core::ports::{AccountDao, DomainModelDao};
//! use iew_store::{DatabasePool, SqliteStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = DatabasePool::in_memory().await?;
//! let store = SqliteStore::new(pool.pool().clone());
//! let accounts = store.accounts();
//! let saved = accounts.save(Account::new("alice", "hash")?).await?;
//! assert!(accounts.find_account_by_username("alice").await?.is_some());
//! # Ok(())
//! # }
//! ```

pub mod dao;
pub mod entity;
pub mod finders;
pub mod mock;
pub mod pool;
pub mod query_cache;

use iew_core::ports::PersistenceError;

pub use dao::{SqliteDomainModelDao, SqliteStore};
pub use entity::SqlEntity;
pub use pool::DatabasePool;
pub use query_cache::{Generation, QueryCache};

/// Errors that can occur during store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to establish a database connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Serialization or deserialization of domain types failed
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A persistence contract was violated
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl StoreError {
    /// Converts into an `anyhow::Error` at the port boundary
    ///
    /// Contract violations are unwrapped so callers can
    /// `downcast_ref::<PersistenceError>()`.
    pub fn into_port_error(self) -> anyhow::Error {
        match self {
            StoreError::Persistence(inner) => anyhow::Error::new(inner),
            other => anyhow::Error::new(other),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::QueryFailed(e.to_string())
    }
}
