//! Notebook repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use chainnote_core::{Error, Notebook, NotebookRepository, Result};

/// PostgreSQL implementation of NotebookRepository.
#[derive(Clone)]
pub struct PgNotebookRepository {
    pool: Pool<Postgres>,
}

impl PgNotebookRepository {
    /// Create a new PgNotebookRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn require_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput(
            "Notebook name cannot be empty".to_string(),
        ));
    }
    Ok(name)
}

#[async_trait]
impl NotebookRepository for PgNotebookRepository {
    async fn list(&self, user_id: i64) -> Result<Vec<Notebook>> {
        sqlx::query_as::<_, Notebook>(
            "SELECT notebook_id, user_id, name, created_at
             FROM notebooks WHERE user_id = $1
             ORDER BY name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn get(&self, user_id: i64, id: i64) -> Result<Option<Notebook>> {
        sqlx::query_as::<_, Notebook>(
            "SELECT notebook_id, user_id, name, created_at
             FROM notebooks WHERE user_id = $1 AND notebook_id = $2",
        )
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn create(&self, user_id: i64, name: &str) -> Result<Notebook> {
        let name = require_name(name)?;
        sqlx::query_as::<_, Notebook>(
            "INSERT INTO notebooks (user_id, name) VALUES ($1, $2)
             RETURNING notebook_id, user_id, name, created_at",
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn rename(&self, user_id: i64, id: i64, name: &str) -> Result<Option<Notebook>> {
        let name = require_name(name)?;
        sqlx::query_as::<_, Notebook>(
            "UPDATE notebooks SET name = $3 WHERE user_id = $1 AND notebook_id = $2
             RETURNING notebook_id, user_id, name, created_at",
        )
        .bind(user_id)
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)
    }

    /// Notes filed in the notebook keep their content; the foreign key clears
    /// their `notebook_id`.
    async fn delete(&self, user_id: i64, id: i64) -> Result<Option<Notebook>> {
        sqlx::query_as::<_, Notebook>(
            "DELETE FROM notebooks WHERE user_id = $1 AND notebook_id = $2
             RETURNING notebook_id, user_id, name, created_at",
        )
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)
    }
}
