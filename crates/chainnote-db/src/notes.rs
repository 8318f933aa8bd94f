//! Note repository for the multi-tenant `notes` table.
//!
//! Every statement is scoped by `user_id`; a note owned by someone else reads
//! as absent. Writes that touch more than one table run in a single
//! transaction.

use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row, Transaction};
use tracing::debug;

use chainnote_core::{
    ChainAnnotation, CreateNoteRequest, DeletedNote, Error, Note, NoteRepository, Result,
    SchemaProfile, TrashFilter, UpdateNoteRequest,
};

use crate::tags::reconcile_note_tags_tx;
use crate::trash::{deleted_at_expr, trash_clause, within_retention};

/// PostgreSQL implementation of NoteRepository for the multi-tenant schema.
#[derive(Clone)]
pub struct PgTenantNoteRepository {
    pool: Pool<Postgres>,
    profile: SchemaProfile,
}

// =============================================================================
// QUERY BUILDING
// =============================================================================

/// Hydrated note select with notebook name and sorted tag names.
/// `$1` is always the owner.
fn select_notes_sql(soft_delete: bool, filter: TrashFilter, by_id: bool) -> String {
    let id_clause = if by_id { "AND n.note_id = $2" } else { "" };
    format!(
        r#"
        SELECT
            n.note_id::bigint AS note_id, n.user_id::bigint AS user_id,
            n.notebook_id::bigint AS notebook_id, nb.name AS notebook_name,
            n.title, n.content,
            n.created_at::timestamptz AS created_at,
            n.updated_at::timestamptz AS updated_at,
            {deleted_at} AS deleted_at,
            n.tx_hash, n.tx_status, n.cardano_address,
            n.chain_action, n.chain_label, n.chain_metadata,
            COALESCE(
                (SELECT array_agg(t.name ORDER BY t.name)
                 FROM note_tags nt JOIN tags t ON t.tag_id = nt.tag_id
                 WHERE nt.note_id = n.note_id),
                ARRAY[]::text[]
            ) AS tags
        FROM notes n
        LEFT JOIN notebooks nb ON nb.notebook_id = n.notebook_id
        WHERE n.user_id = $1 {id_clause} {trash}
        ORDER BY n.created_at DESC
        "#,
        deleted_at = deleted_at_expr("n", soft_delete),
        id_clause = id_clause,
        trash = trash_clause("n", soft_delete, filter),
    )
}

/// Map a hydrated select row to a Note.
///
/// Decode failures surface as `Error::Database` rather than panicking.
fn map_row_to_note(row: &sqlx::postgres::PgRow) -> Result<Note> {
    Ok(Note {
        id: row.try_get("note_id")?,
        user_id: Some(row.try_get("user_id")?),
        notebook_id: row.try_get("notebook_id")?,
        notebook_name: row.try_get("notebook_name")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        tags: row.try_get("tags")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
        chain: ChainAnnotation {
            tx_hash: row.try_get("tx_hash")?,
            tx_status: row.try_get("tx_status")?,
            cardano_address: row.try_get("cardano_address")?,
            chain_action: row.try_get("chain_action")?,
            chain_label: row.try_get("chain_label")?,
            chain_metadata: row.try_get("chain_metadata")?,
        },
    })
}

impl PgTenantNoteRepository {
    /// Create a repository for a multi-tenant schema described by `profile`.
    pub fn new(pool: Pool<Postgres>, profile: SchemaProfile) -> Self {
        Self { pool, profile }
    }

    /// Fetch a note inside an existing transaction.
    async fn fetch_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        id: i64,
        filter: TrashFilter,
    ) -> Result<Option<Note>> {
        let sql = select_notes_sql(self.profile.soft_delete, filter, true);
        let row = sqlx::query(&sql)
            .bind(user_id)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(Error::Database)?;
        row.as_ref().map(map_row_to_note).transpose()
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

    /// Reject notebook ids the caller does not own.
    async fn ensure_notebook_owned_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        notebook_id: Option<i64>,
    ) -> Result<()> {
        let Some(notebook_id) = notebook_id else {
            return Ok(());
        };
        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM notebooks WHERE notebook_id = $1 AND user_id = $2)",
        )
        .bind(notebook_id)
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(Error::Database)?;

        if owned {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "Notebook {} not found",
                notebook_id
            )))
        }
    }

    /// Insert a note within an existing transaction.
    pub async fn create_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        req: CreateNoteRequest,
    ) -> Result<Note> {
        self.ensure_notebook_owned_tx(tx, user_id, req.notebook_id)
            .await?;

        let chain = req.chain;
        let note_id: i64 = sqlx::query_scalar(
            "INSERT INTO notes (user_id, notebook_id, title, content,
                                tx_hash, tx_status, cardano_address,
                                chain_action, chain_label, chain_metadata)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING note_id::bigint",
        )
        .bind(user_id)
        .bind(req.notebook_id)
        .bind(&req.title)
        .bind(&req.content)
        .bind(&chain.tx_hash)
        .bind(&chain.tx_status)
        .bind(&chain.cardano_address)
        .bind(&chain.chain_action)
        .bind(&chain.chain_label)
        .bind(&chain.chain_metadata)
        .fetch_one(&mut **tx)
        .await
        .map_err(Error::Database)?;

        if !req.tags.is_empty() {
            reconcile_note_tags_tx(tx, user_id, note_id, &req.tags).await?;
        }

        self.fetch_tx(tx, user_id, note_id, TrashFilter::Live)
            .await?
            .ok_or_else(|| Error::Internal(format!("Note {} vanished after insert", note_id)))
    }

    /// Update a live note within an existing transaction.
    pub async fn update_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        id: i64,
        req: UpdateNoteRequest,
    ) -> Result<Option<Note>> {
        let live = if self.profile.soft_delete {
            "AND deleted_at IS NULL"
        } else {
            ""
        };

        // A missing note wins over a bad notebook id.
        let lock_sql = format!(
            "SELECT note_id::bigint FROM notes
             WHERE user_id = $1 AND note_id = $2 {}
             FOR UPDATE",
            live
        );
        let existing: Option<i64> = sqlx::query_scalar(&lock_sql)
            .bind(user_id)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(Error::Database)?;
        if existing.is_none() {
            return Ok(None);
        }

        self.ensure_notebook_owned_tx(tx, user_id, req.notebook_id)
            .await?;
        let sql = format!(
            "UPDATE notes SET
                title = $3,
                content = $4,
                notebook_id = $5,
                tx_hash = COALESCE($6, tx_hash),
                tx_status = COALESCE($7, tx_status),
                cardano_address = COALESCE($8, cardano_address),
                chain_action = COALESCE($9, chain_action),
                chain_label = COALESCE($10, chain_label),
                chain_metadata = COALESCE($11, chain_metadata),
                updated_at = now()
             WHERE user_id = $1 AND note_id = $2 {}
             RETURNING note_id::bigint",
            live
        );

        let chain = req.chain;
        let updated: Option<i64> = sqlx::query_scalar(&sql)
            .bind(user_id)
            .bind(id)
            .bind(&req.title)
            .bind(&req.content)
            .bind(req.notebook_id)
            .bind(&chain.tx_hash)
            .bind(&chain.tx_status)
            .bind(&chain.cardano_address)
            .bind(&chain.chain_action)
            .bind(&chain.chain_label)
            .bind(&chain.chain_metadata)
            .fetch_optional(&mut **tx)
            .await
            .map_err(Error::Database)?;

        if updated.is_none() {
            return Ok(None);
        }

        if let Some(tags) = &req.tags {
            reconcile_note_tags_tx(tx, user_id, id, tags).await?;
        }

        self.fetch_tx(tx, user_id, id, TrashFilter::Live).await
    }
}

#[async_trait]
impl NoteRepository for PgTenantNoteRepository {
    fn profile(&self) -> SchemaProfile {
        self.profile
    }

    async fn list(&self, user_id: i64, filter: TrashFilter) -> Result<Vec<Note>> {
        let start = Instant::now();
        let sql = select_notes_sql(self.profile.soft_delete, filter, false);
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let notes = rows.iter().map(map_row_to_note).collect::<Result<Vec<Note>>>()?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "list",
            user_id,
            filter = ?filter,
            result_count = notes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Listed notes"
        );

        Ok(notes)
    }

    async fn get(&self, user_id: i64, id: i64) -> Result<Option<Note>> {
        let sql = select_notes_sql(self.profile.soft_delete, TrashFilter::Live, true);
        let row = sqlx::query(&sql)
            .bind(user_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        row.as_ref().map(map_row_to_note).transpose()
    }

    async fn create(&self, user_id: i64, req: CreateNoteRequest) -> Result<Note> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let note = self.create_tx(&mut tx, user_id, req).await?;
        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "create",
            user_id,
            note_id = note.id,
            tag_count = note.tags.len(),
            "Created note"
        );
        Ok(note)
    }

    async fn update(
        &self,
        user_id: i64,
        id: i64,
        req: UpdateNoteRequest,
    ) -> Result<Option<Note>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let note = self.update_tx(&mut tx, user_id, id, req).await?;
        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "update",
            user_id,
            note_id = id,
            found = note.is_some(),
            "Updated note"
        );
        Ok(note)
    }

    async fn soft_delete(&self, user_id: i64, id: i64) -> Result<Option<DeletedNote>> {
        if !self.profile.soft_delete {
            return self.purge(user_id, id).await;
        }

        let row = sqlx::query(
            "UPDATE notes SET deleted_at = now(), updated_at = now()
             WHERE user_id = $1 AND note_id = $2 AND deleted_at IS NULL
             RETURNING note_id::bigint AS note_id, deleted_at::timestamptz AS deleted_at",
        )
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "soft_delete",
            user_id,
            note_id = id,
            found = row.is_some(),
            "Soft-deleted note"
        );

        match row {
            Some(r) => Ok(Some(DeletedNote {
                id: r.try_get("note_id")?,
                deleted_at: r.try_get::<DateTime<Utc>, _>("deleted_at")?,
                hard: false,
            })),
            // Already in the trash: deleting again removes it for good.
            None => self.purge(user_id, id).await,
        }
    }

    async fn restore(&self, user_id: i64, id: i64) -> Result<Option<Note>> {
        if !self.profile.soft_delete {
            return Ok(None);
        }

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let sql = format!(
            "UPDATE notes SET deleted_at = NULL, updated_at = now()
             WHERE user_id = $1 AND note_id = $2 AND {}
             RETURNING note_id::bigint",
            within_retention("notes")
        );
        let restored: Option<i64> = sqlx::query_scalar(&sql)
            .bind(user_id)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let note = match restored {
            Some(_) => self.fetch_tx(&mut tx, user_id, id, TrashFilter::Live).await?,
            None => None,
        };
        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "restore",
            user_id,
            note_id = id,
            found = note.is_some(),
            "Restored note"
        );
        Ok(note)
    }

    async fn hard_delete(&self, user_id: i64, id: i64) -> Result<Option<i64>> {
        let removed: Option<i64> = sqlx::query_scalar(
            "DELETE FROM notes WHERE user_id = $1 AND note_id = $2 RETURNING note_id::bigint",
        )
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "hard_delete",
            user_id,
            note_id = id,
            found = removed.is_some(),
            "Hard-deleted note"
        );
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_sql_scopes_by_owner_and_orders_newest_first() {
        let sql = select_notes_sql(true, TrashFilter::Live, false);
        assert!(sql.contains("WHERE n.user_id = $1"));
        assert!(sql.contains("AND n.deleted_at IS NULL"));
        assert!(sql.contains("ORDER BY n.created_at DESC"));
        assert!(!sql.contains("$2"));
    }

    #[test]
    fn test_get_sql_binds_note_id() {
        let sql = select_notes_sql(true, TrashFilter::Live, true);
        assert!(sql.contains("AND n.note_id = $2"));
    }

    #[test]
    fn test_sql_without_soft_delete_never_references_column() {
        for filter in [
            TrashFilter::Live,
            TrashFilter::IncludeDeleted,
            TrashFilter::OnlyDeleted,
        ] {
            let sql = select_notes_sql(false, filter, false);
            assert!(!sql.contains("n.deleted_at"), "{:?}: {}", filter, sql);
            assert!(sql.contains("NULL::timestamptz AS deleted_at"));
        }
    }

    #[test]
    fn test_sql_joins_notebook_and_aggregates_tags() {
        let sql = select_notes_sql(true, TrashFilter::IncludeDeleted, false);
        assert!(sql.contains("LEFT JOIN notebooks nb"));
        assert!(sql.contains("array_agg(t.name ORDER BY t.name)"));
    }

    #[test]
    fn test_select_normalizes_id_and_timestamp_types() {
        let sql = select_notes_sql(true, TrashFilter::Live, true);
        assert!(sql.contains("n.note_id::bigint AS note_id"));
        assert!(sql.contains("n.user_id::bigint AS user_id"));
        assert!(sql.contains("n.notebook_id::bigint AS notebook_id"));
        assert!(sql.contains("n.created_at::timestamptz AS created_at"));
        assert!(sql.contains("n.updated_at::timestamptz AS updated_at"));
        assert!(sql.contains("n.deleted_at::timestamptz AS deleted_at"));
    }
}
