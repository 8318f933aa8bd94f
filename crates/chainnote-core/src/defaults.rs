//! Centralized default constants for chainnote.
//!
//! All crates and the CLI reference these constants instead of defining their
//! own magic numbers.

// =============================================================================
// TRASH
// =============================================================================

/// Days a soft-deleted note stays visible in the trash and can be restored.
pub const TRASH_RETENTION_DAYS: i64 = 30;

// =============================================================================
// TAGS
// =============================================================================

/// Maximum number of tags kept on a single note; extra names are dropped.
pub const MAX_TAGS_PER_NOTE: usize = 50;

// =============================================================================
// DATABASE POOL
// =============================================================================

/// Default maximum number of connections in the pool.
pub const DB_MAX_CONNECTIONS: u32 = 10;

/// Default connection acquire timeout in seconds.
pub const DB_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default idle timeout in seconds.
pub const DB_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default maximum connection lifetime in seconds.
pub const DB_MAX_LIFETIME_SECS: u64 = 1800;

/// Database URL used when `DATABASE_URL` is unset.
pub const DATABASE_URL: &str = "postgres://localhost/chainnote";
