//! Physical shape of the `notes` table.
//!
//! Two incompatible shapes exist in deployed databases: the multi-tenant shape
//! (`note_id`, `user_id`, ...) and the legacy single-tenant shape (`id`, ...).
//! The shape is classified once from the column catalog and then handed to the
//! note repository that matches it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which `notes` table shape is in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaMode {
    /// `note_id` primary key, every row owned by a `user_id`.
    MultiTenant,
    /// Legacy `id` primary key, no owner column.
    Simple,
}

impl SchemaMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaMode::MultiTenant => "multi_tenant",
            SchemaMode::Simple => "simple",
        }
    }
}

impl fmt::Display for SchemaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detected capabilities of the `notes` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaProfile {
    pub mode: SchemaMode,
    /// `deleted_at` column present.
    pub soft_delete: bool,
}

impl SchemaProfile {
    /// Classify a `notes` table from its column names.
    ///
    /// Multi-tenant wins when both `note_id` and `user_id` are present. A table
    /// with neither shape (or no `notes` table at all) is a configuration
    /// error; no fallback mode is assumed.
    pub fn from_columns<S: AsRef<str>>(columns: &[S]) -> Result<Self> {
        let has = |name: &str| columns.iter().any(|c| c.as_ref() == name);

        let mode = if has("note_id") && has("user_id") {
            SchemaMode::MultiTenant
        } else if has("id") {
            SchemaMode::Simple
        } else if columns.is_empty() {
            return Err(Error::Config(
                "Table 'notes' not found in the current schema".to_string(),
            ));
        } else {
            return Err(Error::Config(
                "Table 'notes' has neither (note_id, user_id) nor id columns".to_string(),
            ));
        };

        Ok(Self {
            mode,
            soft_delete: has("deleted_at"),
        })
    }

    pub fn is_multi_tenant(&self) -> bool {
        self.mode == SchemaMode::MultiTenant
    }
}

/// Trash visibility for note listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrashFilter {
    /// Only notes that are not deleted.
    #[default]
    Live,
    /// Live notes plus notes deleted within the retention window.
    IncludeDeleted,
    /// Only notes deleted within the retention window.
    OnlyDeleted,
}

impl TrashFilter {
    /// Build a filter from the two listing flags; `only_deleted` wins.
    pub fn from_flags(include_deleted: bool, only_deleted: bool) -> Self {
        match (include_deleted, only_deleted) {
            (_, true) => TrashFilter::OnlyDeleted,
            (true, false) => TrashFilter::IncludeDeleted,
            (false, false) => TrashFilter::Live,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_tenant_with_soft_delete() {
        let profile = SchemaProfile::from_columns(&[
            "note_id",
            "user_id",
            "notebook_id",
            "title",
            "content",
            "deleted_at",
        ])
        .unwrap();
        assert_eq!(profile.mode, SchemaMode::MultiTenant);
        assert!(profile.soft_delete);
        assert!(profile.is_multi_tenant());
    }

    #[test]
    fn test_simple_without_soft_delete() {
        let profile = SchemaProfile::from_columns(&["id", "title", "content"]).unwrap();
        assert_eq!(profile.mode, SchemaMode::Simple);
        assert!(!profile.soft_delete);
    }

    #[test]
    fn test_note_id_without_user_id_falls_to_simple_when_id_present() {
        let profile = SchemaProfile::from_columns(&["id", "note_id", "title"]).unwrap();
        assert_eq!(profile.mode, SchemaMode::Simple);
    }

    #[test]
    fn test_unrecognised_shape_is_config_error() {
        let err = SchemaProfile::from_columns(&["note_id", "title"]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_table_is_config_error() {
        let err = SchemaProfile::from_columns::<&str>(&[]).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(SchemaMode::MultiTenant.to_string(), "multi_tenant");
        assert_eq!(SchemaMode::Simple.to_string(), "simple");
    }

    #[test]
    fn test_trash_filter_from_flags() {
        assert_eq!(TrashFilter::from_flags(false, false), TrashFilter::Live);
        assert_eq!(
            TrashFilter::from_flags(true, false),
            TrashFilter::IncludeDeleted
        );
        assert_eq!(TrashFilter::from_flags(false, true), TrashFilter::OnlyDeleted);
        assert_eq!(TrashFilter::from_flags(true, true), TrashFilter::OnlyDeleted);
    }
}
