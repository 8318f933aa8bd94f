//! # chainnote-db
//!
//! PostgreSQL database layer for chainnote.
//!
//! This crate provides:
//! - Connection pool management
//! - Detection of the `notes` table shape (multi-tenant or simple)
//! - Note repositories for both shapes, chosen once at startup
//! - Transactional tag reconciliation
//! - Notebook, tag, and user repositories
//!
//! ## Example
//!
//! ```rust,ignore
//! use chainnote_db::{CreateNoteRequest, Database, NoteRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/chainnote").await?;
//!
//!     let note = db.notes.create(7, CreateNoteRequest {
//!         title: "Groceries".to_string(),
//!         content: "milk, eggs".to_string(),
//!         tags: vec!["home".to_string(), "errands".to_string()],
//!         ..Default::default()
//!     }).await?;
//!
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```
pub mod notebooks;
pub mod notes;
pub mod pool;
pub mod schema_detect;
pub mod schema_name;
pub mod simple_notes;
pub mod tags;
mod trash;
pub mod users;

// Always compiled so integration tests (in tests/) can use the fixtures.
pub mod test_fixtures;

use std::sync::Arc;

use sqlx::{PgPool, Pool, Postgres};

// Re-export core types
pub use chainnote_core::*;

pub use notebooks::PgNotebookRepository;
pub use notes::PgTenantNoteRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use schema_detect::{detect_schema_profile, notes_columns};
pub use schema_name::validate_schema_name;
pub use simple_notes::PgSimpleNoteRepository;
pub use tags::PgTagRepository;
pub use users::PgUserRepository;

/// Build the note repository matching `profile`.
pub fn note_repository_for(pool: Pool<Postgres>, profile: SchemaProfile) -> Arc<dyn NoteRepository> {
    match profile.mode {
        SchemaMode::MultiTenant => Arc::new(PgTenantNoteRepository::new(pool, profile)),
        SchemaMode::Simple => Arc::new(PgSimpleNoteRepository::new(pool, profile)),
    }
}

/// Apply the bundled migrations.
#[cfg(feature = "migrations")]
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
    Ok(())
}

/// Combined database context with all repositories.
///
/// The schema profile is detected once when the context is built and is
/// fixed for its lifetime.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: Pool<Postgres>,
    /// Shape of the `notes` table this context was built against.
    pub profile: SchemaProfile,
    /// Note repository for the detected schema.
    pub notes: Arc<dyn NoteRepository>,
    /// Notebook repository.
    pub notebooks: PgNotebookRepository,
    /// Tag repository.
    pub tags: PgTagRepository,
    /// User and wallet-link repository.
    pub users: PgUserRepository,
}

impl Database {
    /// Detect the schema profile and build every repository.
    pub async fn new(pool: Pool<Postgres>) -> Result<Self> {
        let profile = detect_schema_profile(&pool).await?;
        Ok(Self::with_profile(pool, profile))
    }

    /// Build every repository for a known profile without touching the catalog.
    pub fn with_profile(pool: Pool<Postgres>, profile: SchemaProfile) -> Self {
        Self {
            notes: note_repository_for(pool.clone(), profile),
            notebooks: PgNotebookRepository::new(pool.clone()),
            tags: PgTagRepository::new(pool.clone(), profile.soft_delete),
            users: PgUserRepository::new(pool.clone()),
            profile,
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Self::new(pool).await
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Self::new(pool).await
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
