//! Core traits for chainnote abstractions.
//!
//! These traits define the interfaces that concrete storage implementations
//! must satisfy. Every lookup or mutation that can miss returns `Ok(None)`
//! when the row does not exist or belongs to another user.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::*;
use crate::schema::{SchemaProfile, TrashFilter};
use crate::wallet::WalletNetwork;

// =============================================================================
// NOTE REPOSITORY TRAITS
// =============================================================================

/// Request for creating a new note.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
    pub notebook_id: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub chain: ChainAnnotation,
}

impl CreateNoteRequest {
    /// Reject empty title or content. Called by the calling layer; the
    /// repository assumes validated input.
    pub fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        require_text("content", &self.content)
    }
}

/// Request for updating an existing note.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: String,
    pub content: String,
    pub notebook_id: Option<i64>,
    /// `Some` replaces the tag set, `None` leaves tags untouched.
    pub tags: Option<Vec<String>>,
    /// Each `None` field keeps the stored value.
    #[serde(flatten)]
    pub chain: ChainAnnotation,
}

impl UpdateNoteRequest {
    pub fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        require_text("content", &self.content)
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} is required", field)));
    }
    Ok(())
}

/// Repository for note CRUD, soft-delete, and restore.
///
/// `user_id` scopes every call on multi-tenant schemas; the legacy simple
/// schema has no owner column and ignores it.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// The schema profile this repository was built for.
    fn profile(&self) -> SchemaProfile;

    /// List notes, newest first.
    async fn list(&self, user_id: i64, filter: TrashFilter) -> Result<Vec<Note>>;

    /// Fetch a single live note.
    async fn get(&self, user_id: i64, id: i64) -> Result<Option<Note>>;

    /// Insert a note and attach its tags.
    async fn create(&self, user_id: i64, req: CreateNoteRequest) -> Result<Note>;

    /// Replace title/content, optionally replace tags, coalesce chain fields.
    async fn update(&self, user_id: i64, id: i64, req: UpdateNoteRequest)
        -> Result<Option<Note>>;

    /// Move a live note to the trash, or remove it when soft-delete is
    /// unsupported.
    async fn soft_delete(&self, user_id: i64, id: i64) -> Result<Option<DeletedNote>>;

    /// Bring a recently deleted note back.
    async fn restore(&self, user_id: i64, id: i64) -> Result<Option<Note>>;

    /// Permanently remove a note, live or trashed.
    async fn hard_delete(&self, user_id: i64, id: i64) -> Result<Option<i64>>;
}

// =============================================================================
// NOTEBOOK REPOSITORY TRAITS
// =============================================================================

/// Repository for user-owned notebooks.
#[async_trait]
pub trait NotebookRepository: Send + Sync {
    async fn list(&self, user_id: i64) -> Result<Vec<Notebook>>;

    async fn get(&self, user_id: i64, id: i64) -> Result<Option<Notebook>>;

    async fn create(&self, user_id: i64, name: &str) -> Result<Notebook>;

    async fn rename(&self, user_id: i64, id: i64, name: &str) -> Result<Option<Notebook>>;

    async fn delete(&self, user_id: i64, id: i64) -> Result<Option<Notebook>>;
}

// =============================================================================
// TAG REPOSITORY TRAITS
// =============================================================================

/// Repository for user-owned tags and their note links.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// List tags with live-note counts, ordered by name.
    async fn list(&self, user_id: i64) -> Result<Vec<Tag>>;

    /// Create a tag, returning the existing one if the name is taken.
    async fn create(&self, user_id: i64, name: &str) -> Result<Tag>;

    async fn rename(&self, user_id: i64, id: i64, name: &str) -> Result<Option<Tag>>;

    /// Delete a tag and (by cascade) its note links.
    async fn delete(&self, user_id: i64, id: i64) -> Result<Option<Tag>>;

    /// Tag names linked to a note, ordered by name.
    async fn tags_for_note(&self, user_id: i64, note_id: i64) -> Result<Vec<String>>;

    /// Make a note's tag links exactly match `names`.
    async fn set_for_note(&self, user_id: i64, note_id: i64, names: &[String]) -> Result<()>;
}

// =============================================================================
// USER REPOSITORY TRAITS
// =============================================================================

/// Request for registering a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Request for linking a wallet to a user.
#[derive(Debug, Clone)]
pub struct LinkWalletRequest {
    pub address: String,
    pub label: Option<String>,
    pub network: WalletNetwork,
}

/// Repository for users and their linked wallet.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, req: CreateUserRequest) -> Result<User>;

    async fn get(&self, id: i64) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn link_wallet(&self, id: i64, req: LinkWalletRequest) -> Result<Option<User>>;

    async fn unlink_wallet(&self, id: i64) -> Result<Option<User>>;
}
