//! Structured logging field name constants for chainnote.
//!
//! All crates use these constants for consistent structured logging fields.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Operation failed, requires operator attention |
//! | WARN  | Recoverable issue, input silently adjusted |
//! | INFO  | Lifecycle events (startup, schema detection, migrations) |
//! | DEBUG | Repository operation completions, decision points |
//! | TRACE | Per-item iteration (tag links added/removed) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "db", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pool", "schema", "notes", "tags", "notebooks", "users"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "create", "update", "soft_delete", "reconcile"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Owning user id.
pub const USER_ID: &str = "user_id";

/// Note id (either `note_id` or legacy `id`).
pub const NOTE_ID: &str = "note_id";

/// Notebook id.
pub const NOTEBOOK_ID: &str = "notebook_id";

/// Detected schema mode ("multi_tenant" or "simple").
pub const SCHEMA_MODE: &str = "schema_mode";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of rows returned by a query.
pub const RESULT_COUNT: &str = "result_count";

/// Tag associations added by reconciliation.
pub const TAGS_ADDED: &str = "tags_added";

/// Tag associations removed by reconciliation.
pub const TAGS_REMOVED: &str = "tags_removed";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ALL: &[&str] = &[
        SUBSYSTEM,
        COMPONENT,
        OPERATION,
        USER_ID,
        NOTE_ID,
        NOTEBOOK_ID,
        SCHEMA_MODE,
        DURATION_MS,
        RESULT_COUNT,
        TAGS_ADDED,
        TAGS_REMOVED,
        POOL_SIZE,
        POOL_IDLE,
    ];

    #[test]
    fn test_field_names_are_unique_snake_case() {
        let unique: HashSet<_> = ALL.iter().collect();
        assert_eq!(unique.len(), ALL.len());
        for name in ALL {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "{} is not snake_case",
                name
            );
        }
    }
}
