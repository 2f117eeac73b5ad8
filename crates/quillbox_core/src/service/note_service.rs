//! Note use-case service.
//!
//! # Responsibility
//! - Provide note create/get/list/update/delete APIs over a repository.
//! - Map absence to semantic `NoteNotFound` errors per operation contract.
//!
//! # Invariants
//! - `update_note` uses full title/content replacement semantics; the API
//!   offers no way to touch `id` or `owner_id`.
//! - Note list is always sorted by `updated_at DESC, id ASC`.
//! - Expired notes are served unless the caller opts into the
//!   `active_at` filter.

use crate::model::note::{Note, NoteId};
use crate::model::user::UserId;
use crate::repo::note_repo::{NoteListQuery, NoteRecord, NoteRepository};
use crate::repo::user_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Referenced owner was absent at creation time.
    OwnerNotFound(UserId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::OwnerNotFound(id) => write!(f, "note owner not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent note state: {details}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NoteNotFound(id) => Self::NoteNotFound(id),
            RepoError::OwnerNotFound(id) => Self::OwnerNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one note for an existing owner.
    ///
    /// `expires_at` is stored as given (epoch milliseconds); `None` means
    /// the note never expires. Fails with `OwnerNotFound` when `owner_id`
    /// does not resolve, in which case nothing is persisted.
    pub fn create_note(
        &mut self,
        owner_id: UserId,
        title: impl Into<String>,
        content: impl Into<String>,
        expires_at: Option<i64>,
    ) -> Result<NoteRecord, NoteServiceError> {
        let mut note = Note::new(owner_id, title, content);
        note.expires_at = expires_at;

        let id = self.repo.create_note(&note)?;
        self.repo
            .get_note(id)?
            .ok_or(NoteServiceError::InconsistentState(
                "created note not found in read-back",
            ))
    }

    /// Gets one note by stable ID.
    ///
    /// Absence is an error at this layer: callers asked for a specific id.
    pub fn get_note(&self, id: NoteId) -> Result<NoteRecord, NoteServiceError> {
        self.repo
            .get_note(id)?
            .ok_or(NoteServiceError::NoteNotFound(id))
    }

    /// Lists notes using optional owner/expiration filters and pagination.
    ///
    /// The default query returns all notes, expired ones included.
    pub fn list_notes(&self, query: &NoteListQuery) -> Result<Vec<NoteRecord>, NoteServiceError> {
        Ok(self.repo.list_notes(query)?)
    }

    /// Replaces title and content of an existing note.
    ///
    /// Owner and id are immutable; the repository statement never touches
    /// them.
    pub fn update_note(
        &self,
        id: NoteId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<NoteRecord, NoteServiceError> {
        let title = title.into();
        let content = content.into();
        self.repo.update_note(id, title.as_str(), content.as_str())?;

        self.repo
            .get_note(id)?
            .ok_or(NoteServiceError::InconsistentState(
                "updated note not found in read-back",
            ))
    }

    /// Removes one note by stable ID.
    ///
    /// Idempotent in effect: afterwards the id is absent either way. A
    /// second call reports `NoteNotFound`, which callers must surface.
    pub fn delete_note(&self, id: NoteId) -> Result<(), NoteServiceError> {
        Ok(self.repo.delete_note(id)?)
    }
}
