//! Core data models for chainnote.
//!
//! These types are shared across all chainnote crates and represent the core
//! domain entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::wallet::WalletNetwork;

// =============================================================================
// NOTE TYPES
// =============================================================================

/// Optional blockchain annotation carried by a note.
///
/// Every field is independent: a note may have none, some, or all of them.
/// On update, a `None` field keeps whatever is stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainAnnotation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardano_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_metadata: Option<JsonValue>,
}

impl ChainAnnotation {
    /// True when no field is populated.
    pub fn is_empty(&self) -> bool {
        self.tx_hash.is_none()
            && self.tx_status.is_none()
            && self.cardano_address.is_none()
            && self.chain_action.is_none()
            && self.chain_label.is_none()
            && self.chain_metadata.is_none()
    }
}

/// A fully hydrated note.
///
/// `id` is the `note_id` column on multi-tenant schemas and the `id` column on
/// the legacy simple schema. Simple-schema notes carry no owner, notebook,
/// tags, or chain annotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notebook_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notebook_name: Option<String>,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub chain: ChainAnnotation,
}

impl Note {
    /// Whether the note is in the trash.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedNote {
    pub id: i64,
    pub deleted_at: DateTime<Utc>,
    /// True when the row was physically removed because the schema has no
    /// soft-delete column.
    pub hard: bool,
}

// =============================================================================
// NOTEBOOK / TAG TYPES
// =============================================================================

/// A user-owned notebook grouping notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notebook {
    #[sqlx(rename = "notebook_id")]
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A user-owned tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    /// Number of live notes carrying this tag (computed)
    #[serde(default)]
    pub note_count: i64,
}

// =============================================================================
// USER TYPES
// =============================================================================

/// A registered user, with an optional linked Cardano wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet: Option<LinkedWallet>,
}

/// Wallet fields stored on the user row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedWallet {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub network: WalletNetwork,
    pub connected_at: DateTime<Utc>,
}
