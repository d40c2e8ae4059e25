//! Test fixtures for database integration tests.
//!
//! Each [`TestDatabase`] runs the migrations inside its own freshly created
//! schema, so tests can run in parallel against one server.
//!
//! ## Configuration
//!
//! The test database URL is read from `DATABASE_URL`. When it is not set,
//! [`TestDatabase::try_new`] returns `None` and the calling test should
//! return early.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kbase_db::test_fixtures::TestDatabase;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let Some(test_db) = TestDatabase::try_new().await else {
//!         return;
//!     };
//!
//!     // Run your tests against test_db.db ...
//!
//!     test_db.cleanup().await;
//! }
//! ```

use std::time::Duration;

use sqlx::{Executor, PgPool};
use uuid::Uuid;

use crate::{Database, PoolConfig};

/// Test database connection scoped to a throwaway schema.
pub struct TestDatabase {
    pub db: Database,
    schema_name: String,
}

impl TestDatabase {
    /// Connect to `DATABASE_URL`, create a unique schema and migrate it.
    ///
    /// Returns `None` when `DATABASE_URL` is not set.
    pub async fn try_new() -> Option<Self> {
        let database_url = std::env::var("DATABASE_URL").ok()?;

        let schema_name = format!("test_{}", Uuid::new_v4().simple());

        // Create the schema on a plain connection first.
        let bootstrap = PgPool::connect(&database_url)
            .await
            .expect("Failed to connect to test database");
        sqlx::query(&format!("CREATE SCHEMA {}", schema_name))
            .execute(&bootstrap)
            .await
            .expect("Failed to create test schema");
        bootstrap.close().await;

        // Every pooled connection searches the test schema first.
        let search_path = format!("SET search_path TO {}, public", schema_name);
        let pool = PoolConfig::default()
            .with_max_connections(5)
            .with_acquire_timeout(Duration::from_secs(30))
            .options()
            .after_connect(move |conn, _meta| {
                let search_path = search_path.clone();
                Box::pin(async move {
                    conn.execute(search_path.as_str()).await?;
                    Ok(())
                })
            })
            .connect(&database_url)
            .await
            .expect("Failed to create test database pool");

        let db = Database::new(pool);
        db.migrate().await.expect("Failed to run migrations");

        Some(Self { db, schema_name })
    }

    /// Drop the test schema and everything in it.
    pub async fn cleanup(self) {
        let _ = sqlx::query(&format!(
            "DROP SCHEMA IF EXISTS {} CASCADE",
            self.schema_name
        ))
        .execute(&self.db.pool)
        .await;
        self.db.pool.close().await;
    }
}
