//! Detection of the `notes` table shape from the column catalog.

use std::time::Instant;

use sqlx::PgPool;
use tracing::info;

use chainnote_core::{Error, Result, SchemaProfile};

/// Read the column names of `notes` in the connection's current schema.
pub async fn notes_columns(pool: &PgPool) -> Result<Vec<String>> {
    sqlx::query_scalar(
        "SELECT column_name::text
         FROM information_schema.columns
         WHERE table_schema = current_schema() AND table_name = 'notes'
         ORDER BY ordinal_position",
    )
    .fetch_all(pool)
    .await
    .map_err(Error::Database)
}

/// Classify the `notes` table once.
///
/// Catalog errors propagate; an unrecognised table shape is a
/// `Error::Config`. Callers hold on to the returned profile; nothing here
/// caches or re-detects.
pub async fn detect_schema_profile(pool: &PgPool) -> Result<SchemaProfile> {
    let start = Instant::now();
    let columns = notes_columns(pool).await?;
    let profile = SchemaProfile::from_columns(&columns)?;

    info!(
        subsystem = "db",
        component = "schema",
        op = "detect",
        schema_mode = %profile.mode,
        soft_delete = profile.soft_delete,
        column_count = columns.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Detected notes schema"
    );

    Ok(profile)
}
