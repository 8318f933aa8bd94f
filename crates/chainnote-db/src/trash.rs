//! SQL fragments for soft-delete visibility.
//!
//! The fragments reference only the compile-time retention constant, never
//! user input, so they are safe to splice into query text.

use chainnote_core::defaults::TRASH_RETENTION_DAYS;
use chainnote_core::TrashFilter;

/// `deleted_at` expression for the select list, always `timestamptz`.
/// Schemas without the column yield a typed NULL so row mapping stays uniform.
pub(crate) fn deleted_at_expr(alias: &str, soft_delete: bool) -> String {
    if soft_delete {
        format!("{}.deleted_at::timestamptz", alias)
    } else {
        "NULL::timestamptz".to_string()
    }
}

/// Predicate matching rows deleted inside the retention window.
pub(crate) fn within_retention(alias: &str) -> String {
    format!(
        "{a}.deleted_at IS NOT NULL AND {a}.deleted_at > now() - interval '{days} days'",
        a = alias,
        days = TRASH_RETENTION_DAYS
    )
}

/// `AND ...` clause for a listing filter.
///
/// Without soft-delete support every row is live: `OnlyDeleted` matches
/// nothing and the other filters match everything.
pub(crate) fn trash_clause(alias: &str, soft_delete: bool, filter: TrashFilter) -> String {
    match (soft_delete, filter) {
        (false, TrashFilter::OnlyDeleted) => "AND FALSE".to_string(),
        (false, _) => String::new(),
        (true, TrashFilter::Live) => format!("AND {}.deleted_at IS NULL", alias),
        (true, TrashFilter::IncludeDeleted) => format!(
            "AND ({a}.deleted_at IS NULL OR ({w}))",
            a = alias,
            w = within_retention(alias)
        ),
        (true, TrashFilter::OnlyDeleted) => format!("AND {}", within_retention(alias)),
    }
}
