//! # chainnote-core
//!
//! Core types, traits, and abstractions for chainnote.
//!
//! This crate provides the domain models, repository traits, schema-profile
//! classification, and tag-reconciliation helpers that the storage crate and
//! the CLI depend on.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod schema;
pub mod tags;
pub mod traits;
pub mod wallet;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use schema::{SchemaMode, SchemaProfile, TrashFilter};
pub use tags::{normalize_tag_names, TagDiff};
pub use traits::*;
pub use wallet::{validate_address, WalletNetwork};
