//! Tag repository implementation and note-tag reconciliation.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row, Transaction};
use tracing::{debug, trace};

use chainnote_core::{normalize_tag_names, Error, Result, Tag, TagDiff, TagRepository};

/// Resolve a tag name to its id for `user_id`, creating the tag if needed.
///
/// A concurrent insert of the same name is absorbed by `ON CONFLICT` and the
/// existing row's id is returned instead.
pub(crate) async fn resolve_tag_id_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
    name: &str,
) -> Result<i64> {
    let inserted: Option<i64> = sqlx::query_scalar(
        "INSERT INTO tags (user_id, name) VALUES ($1, $2)
         ON CONFLICT (user_id, name) DO NOTHING
         RETURNING tag_id",
    )
    .bind(user_id)
    .bind(name)
    .fetch_optional(&mut **tx)
    .await
    .map_err(Error::Database)?;

    if let Some(id) = inserted {
        return Ok(id);
    }

    sqlx::query_scalar("SELECT tag_id FROM tags WHERE user_id = $1 AND name = $2")
        .bind(user_id)
        .bind(name)
        .fetch_one(&mut **tx)
        .await
        .map_err(Error::Database)
}

/// Make `note_id`'s tag links exactly match `names`.
///
/// Names are normalized first; missing tags are created; links are added and
/// removed by diffing against the current set. Tags themselves are never
/// deleted here. The caller owns the transaction, so a failure part-way
/// rolls back with the rest of the note write.
pub(crate) async fn reconcile_note_tags_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
    note_id: i64,
    names: &[String],
) -> Result<TagDiff> {
    let mut desired = BTreeSet::new();
    for name in normalize_tag_names(names) {
        desired.insert(resolve_tag_id_tx(tx, user_id, &name).await?);
    }

    let current: BTreeSet<i64> =
        sqlx::query_scalar::<_, i64>("SELECT tag_id FROM note_tags WHERE note_id = $1")
            .bind(note_id)
            .fetch_all(&mut **tx)
            .await
            .map_err(Error::Database)?
            .into_iter()
            .collect();

    let diff = TagDiff::between(&current, &desired);

    if !diff.to_add.is_empty() {
        trace!(note_id, tag_ids = ?diff.to_add, "Linking tags");
        sqlx::query(
            "INSERT INTO note_tags (note_id, tag_id)
             SELECT $1, UNNEST($2::bigint[])
             ON CONFLICT DO NOTHING",
        )
        .bind(note_id)
        .bind(&diff.to_add)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;
    }

    if !diff.to_remove.is_empty() {
        trace!(note_id, tag_ids = ?diff.to_remove, "Unlinking tags");
        sqlx::query("DELETE FROM note_tags WHERE note_id = $1 AND tag_id = ANY($2)")
            .bind(note_id)
            .bind(&diff.to_remove)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
    }

    debug!(
        subsystem = "db",
        component = "tags",
        op = "reconcile",
        user_id,
        note_id,
        tags_added = diff.to_add.len(),
        tags_removed = diff.to_remove.len(),
        "Reconciled note tags"
    );

    Ok(diff)
}

/// PostgreSQL implementation of TagRepository.
#[derive(Clone)]
pub struct PgTagRepository {
    pool: Pool<Postgres>,
    soft_delete: bool,
}

impl PgTagRepository {
    /// Create a new PgTagRepository. `soft_delete` controls whether trashed
    /// notes are left out of `note_count`.
    pub fn new(pool: Pool<Postgres>, soft_delete: bool) -> Self {
        Self { pool, soft_delete }
    }

    fn map_row(row: &sqlx::postgres::PgRow) -> Tag {
        Tag {
            id: row.get("tag_id"),
            user_id: row.get("user_id"),
            name: row.get("name"),
            note_count: row.get("note_count"),
        }
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn list(&self, user_id: i64) -> Result<Vec<Tag>> {
        let live = if self.soft_delete {
            "AND n.deleted_at IS NULL"
        } else {
            ""
        };
        let sql = format!(
            r#"
            SELECT t.tag_id, t.user_id, t.name, COUNT(n.note_id) AS note_count
            FROM tags t
            LEFT JOIN note_tags nt ON nt.tag_id = t.tag_id
            LEFT JOIN notes n ON n.note_id = nt.note_id {}
            WHERE t.user_id = $1
            GROUP BY t.tag_id, t.user_id, t.name
            ORDER BY t.name
            "#,
            live
        );

        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.iter().map(Self::map_row).collect())
    }

    async fn create(&self, user_id: i64, name: &str) -> Result<Tag> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("Tag name cannot be empty".to_string()));
        }

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let id = resolve_tag_id_tx(&mut tx, user_id, name).await?;
        tx.commit().await.map_err(Error::Database)?;

        Ok(Tag {
            id,
            user_id,
            name: name.to_string(),
            note_count: 0,
        })
    }

    async fn rename(&self, user_id: i64, id: i64, name: &str) -> Result<Option<Tag>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("Tag name cannot be empty".to_string()));
        }

        let row = sqlx::query(
            "UPDATE tags SET name = $3 WHERE user_id = $1 AND tag_id = $2
             RETURNING tag_id, user_id, name, 0::bigint AS note_count",
        )
        .bind(user_id)
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::conflict_on_unique(e, format!("Tag '{}' already exists", name)))?;

        Ok(row.as_ref().map(Self::map_row))
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<Option<Tag>> {
        let row = sqlx::query(
            "DELETE FROM tags WHERE user_id = $1 AND tag_id = $2
             RETURNING tag_id, user_id, name, 0::bigint AS note_count",
        )
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(Self::map_row))
    }

    async fn tags_for_note(&self, user_id: i64, note_id: i64) -> Result<Vec<String>> {
        sqlx::query_scalar(
            "SELECT t.name
             FROM note_tags nt
             JOIN tags t ON t.tag_id = nt.tag_id
             JOIN notes n ON n.note_id = nt.note_id
             WHERE nt.note_id = $1 AND n.user_id = $2
             ORDER BY t.name",
        )
        .bind(note_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn set_for_note(&self, user_id: i64, note_id: i64, names: &[String]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM notes WHERE note_id = $1 AND user_id = $2)",
        )
        .bind(note_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        if !owned {
            return Err(Error::NotFound(format!("Note {} not found", note_id)));
        }

        reconcile_note_tags_tx(&mut tx, user_id, note_id, names).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }
}
