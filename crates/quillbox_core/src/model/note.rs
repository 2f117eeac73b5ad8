//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record owned by exactly one user.
//! - Carry optional expiration metadata without enforcing it.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `owner_id` is set at creation and never changes afterwards.
//! - An absent `expires_at` means the note never expires.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a note.
pub type NoteId = Uuid;

/// Canonical note record created by the note service.
///
/// `title` and `content` are free-form text; no length rule is enforced.
/// Store-maintained timestamps live on the repository read model
/// ([`crate::repo::note_repo::NoteRecord`]), not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable global ID used for lookup and deletion.
    pub id: NoteId,
    /// Short display title.
    pub title: String,
    /// Free-form body text.
    pub content: String,
    /// Owning user; must exist when the note is persisted.
    pub owner_id: UserId,
    /// Optional expiration instant in epoch milliseconds.
    pub expires_at: Option<i64>,
}

impl Note {
    /// Creates a new note with a generated stable ID and no expiration.
    pub fn new(owner_id: UserId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), owner_id, title, content)
    }

    /// Creates a note with a caller-provided stable ID.
    pub fn with_id(
        id: NoteId,
        owner_id: UserId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            owner_id,
            expires_at: None,
        }
    }
}
