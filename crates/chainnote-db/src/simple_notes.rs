//! Note repository for the legacy single-tenant `notes` table.
//!
//! The table is keyed by `id` and has no owner column, so every caller sees
//! every note. Tags, notebooks, and chain annotations have nowhere to live in
//! this shape and are dropped on write.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;

use chainnote_core::{
    ChainAnnotation, CreateNoteRequest, DeletedNote, Error, Note, NoteRepository, Result,
    SchemaProfile, TrashFilter, UpdateNoteRequest,
};

use crate::trash::{deleted_at_expr, trash_clause, within_retention};

/// PostgreSQL implementation of NoteRepository for the simple schema.
#[derive(Clone)]
pub struct PgSimpleNoteRepository {
    pool: Pool<Postgres>,
    profile: SchemaProfile,
}

/// Output columns normalized to `bigint` and `timestamptz`.
///
/// Legacy tables use `SERIAL` ids and `TIMESTAMP` columns.
fn note_columns(alias: &str, soft_delete: bool) -> String {
    format!(
        "{a}.id::bigint AS id, {a}.title, {a}.content,
         {a}.created_at::timestamptz AS created_at,
         {a}.updated_at::timestamptz AS updated_at,
         {d} AS deleted_at",
        a = alias,
        d = deleted_at_expr(alias, soft_delete),
    )
}

fn select_simple_sql(soft_delete: bool, filter: TrashFilter, by_id: bool) -> String {
    let id_clause = if by_id { "AND n.id = $1" } else { "" };
    format!(
        "SELECT {}
         FROM notes n
         WHERE TRUE {} {}
         ORDER BY n.created_at DESC",
        note_columns("n", soft_delete),
        id_clause,
        trash_clause("n", soft_delete, filter),
    )
}

fn map_row_to_note(row: &sqlx::postgres::PgRow) -> Result<Note> {
    Ok(Note {
        id: row.try_get("id")?,
        user_id: None,
        notebook_id: None,
        notebook_name: None,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        tags: Vec::new(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
        chain: ChainAnnotation::default(),
    })
}

/// Log fields the simple table cannot hold.
fn note_dropped_fields(op: &str, tags: usize, notebook: bool, chain: &ChainAnnotation) {
    if tags > 0 || notebook || !chain.is_empty() {
        debug!(
            subsystem = "db",
            component = "simple_notes",
            op,
            tag_count = tags,
            has_notebook = notebook,
            has_chain = !chain.is_empty(),
            "Simple schema ignores tags, notebook, and chain fields"
        );
    }
}

impl PgSimpleNoteRepository {
    /// Create a repository for a simple schema described by `profile`.
    pub fn new(pool: Pool<Postgres>, profile: SchemaProfile) -> Self {
        Self { pool, profile }
    }

    /// Hard delete reported as a delete result.
    async fn purge(&self, user_id: i64, id: i64) -> Result<Option<DeletedNote>> {
        let removed = self.hard_delete(user_id, id).await?;
        Ok(removed.map(|id| DeletedNote {
            id,
            deleted_at: Utc::now(),
            hard: true,
        }))
    }

    async fn fetch(&self, id: i64, filter: TrashFilter) -> Result<Option<Note>> {
        let sql = select_simple_sql(self.profile.soft_delete, filter, true);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        row.as_ref().map(map_row_to_note).transpose()
    }
}

#[async_trait]
impl NoteRepository for PgSimpleNoteRepository {
    fn profile(&self) -> SchemaProfile {
        self.profile
    }

    async fn list(&self, _user_id: i64, filter: TrashFilter) -> Result<Vec<Note>> {
        let sql = select_simple_sql(self.profile.soft_delete, filter, false);
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        rows.iter().map(map_row_to_note).collect()
    }

    async fn get(&self, _user_id: i64, id: i64) -> Result<Option<Note>> {
        self.fetch(id, TrashFilter::Live).await
    }

    async fn create(&self, _user_id: i64, req: CreateNoteRequest) -> Result<Note> {
        note_dropped_fields("create", req.tags.len(), req.notebook_id.is_some(), &req.chain);

        let sql = format!(
            "INSERT INTO notes (title, content) VALUES ($1, $2)
             RETURNING {}",
            note_columns("notes", self.profile.soft_delete)
        );
        let row = sqlx::query(&sql)
            .bind(&req.title)
            .bind(&req.content)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        map_row_to_note(&row)
    }

    async fn update(
        &self,
        _user_id: i64,
        id: i64,
        req: UpdateNoteRequest,
    ) -> Result<Option<Note>> {
        note_dropped_fields(
            "update",
            req.tags.as_ref().map_or(0, Vec::len),
            req.notebook_id.is_some(),
            &req.chain,
        );

        let live = if self.profile.soft_delete {
            "AND deleted_at IS NULL"
        } else {
            ""
        };
        let sql = format!(
            "UPDATE notes SET title = $2, content = $3, updated_at = now()
             WHERE id = $1 {}
             RETURNING {}",
            live,
            note_columns("notes", self.profile.soft_delete)
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(&req.title)
            .bind(&req.content)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        row.as_ref().map(map_row_to_note).transpose()
    }

    async fn soft_delete(&self, user_id: i64, id: i64) -> Result<Option<DeletedNote>> {
        if !self.profile.soft_delete {
            return self.purge(user_id, id).await;
        }

        let row = sqlx::query(
            "UPDATE notes SET deleted_at = now(), updated_at = now()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING id::bigint AS id, deleted_at::timestamptz AS deleted_at",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(r) => Ok(Some(DeletedNote {
                id: r.try_get("id")?,
                deleted_at: r.try_get("deleted_at")?,
                hard: false,
            })),
            // Already in the trash: deleting again removes it for good.
            None => self.purge(user_id, id).await,
        }
    }

    async fn restore(&self, _user_id: i64, id: i64) -> Result<Option<Note>> {
        if !self.profile.soft_delete {
            return Ok(None);
        }

        let sql = format!(
            "UPDATE notes SET deleted_at = NULL, updated_at = now()
             WHERE id = $1 AND {}
             RETURNING {}",
            within_retention("notes"),
            note_columns("notes", true)
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        row.as_ref().map(map_row_to_note).transpose()
    }

    async fn hard_delete(&self, _user_id: i64, id: i64) -> Result<Option<i64>> {
        let removed: Option<i64> = sqlx::query_scalar("DELETE FROM notes WHERE id = $1 RETURNING id::bigint")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "simple_notes",
            op = "hard_delete",
            note_id = id,
            found = removed.is_some(),
            "Hard-deleted note"
        );
        Ok(removed)
    }
}
