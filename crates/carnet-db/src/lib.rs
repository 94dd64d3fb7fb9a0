//! # carnet-db
//!
//! PostgreSQL database layer for carnet.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for notes and categories
//! - Embedded sqlx migrations
//!
//! ## Example
//!
//! ```rust,ignore
//! use carnet_db::Database;
//! use carnet_core::{CreateNoteRequest, NoteRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/carnet").await?;
//!     db.migrate().await?;
//!
//!     let note = db.notes.insert(CreateNoteRequest {
//!         title: "Hello".to_string(),
//!         content: "world".to_string(),
//!     }).await?;
//!
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```

pub mod categories;
pub mod notes;
pub mod pool;

// Test fixtures for integration tests.
// Always compiled so suites in tests/ can use DEFAULT_TEST_DATABASE_URL.
pub mod test_fixtures;

// Re-export core types
pub use carnet_core::*;

// Re-export repository implementations
pub use categories::PgCategoryRepository;
pub use notes::PgNoteRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};

/// Main database handle aggregating all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Note repository for CRUD and membership operations.
    pub notes: PgNoteRepository,
    /// Category repository for CRUD operations.
    pub categories: PgCategoryRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            notes: PgNoteRepository::new(pool.clone()),
            categories: PgCategoryRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect to the database with default pool configuration.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Connect to the database with an explicit pool configuration,
    /// e.g. [`PoolConfig::from_env`].
    pub async fn connect_with_config(database_url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(database_url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations embedded from the workspace `migrations/` directory.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }
}
