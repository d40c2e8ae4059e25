//! # kbase-db
//!
//! Persistence layer for kbase.
//!
//! This crate provides:
//! - [`PoolConfig`] and pool setup
//! - A generic PostgreSQL [`ScopedStore`] for topics, docs and index cards
//! - An in-memory [`ScopedStore`] with the same semantics
//!
//! ## Example
//!
//! ```rust,ignore
//! use kbase_db::{Database, ScopedStore, Topic};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/kbase").await?;
//!     db.migrate().await?;
//!
//!     let topic = db.topics.save(Topic::new("Java")).await?;
//!     println!("Created topic: {:?}", topic.id);
//!     Ok(())
//! }
//! ```

pub mod entities;
pub mod memory;
pub mod pool;
pub mod scoped;

#[cfg(feature = "migrations")]
pub mod test_fixtures;

// Re-export core types
pub use kbase_core::*;

pub use memory::MemoryScopedStore;
pub use pool::{connect_pool, PoolConfig};
pub use scoped::{PgEntity, PgScopedStore};

/// Combined database context with a store per entity kind.
#[derive(Clone)]
pub struct Database {
    /// Shared by every store.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Topic store.
    pub topics: PgScopedStore<Topic>,
    /// Index card store, partitioned by topic.
    pub index_cards: PgScopedStore<IndexCard>,
}

impl Database {
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            topics: PgScopedStore::new(pool.clone()),
            index_cards: PgScopedStore::new(pool.clone()),
            pool,
        }
    }

    /// Doc store for the given owner-key type.
    ///
    /// All owner-key types share the `doc` table; a deployment picks one.
    pub fn docs<O: OwnerKey>(&self) -> PgScopedStore<Doc<O>> {
        PgScopedStore::new(self.pool.clone())
    }

    /// Connect with the default pool sizing.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_config(url, PoolConfig::default()).await
    }

    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = connect_pool(url, &config).await?;
        Ok(Self::new(pool))
    }

    /// Apply the embedded schema migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
