//! Core domain logic for Quillbox: user accounts, note ownership and
//! lifecycle, and credential verification. Request-handling and rendering
//! layers call into this crate and own no business rules themselves.

pub mod db;
pub mod logging;
pub mod model;
pub mod password;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Note, NoteId};
pub use model::user::{User, UserId, UserValidationError};
pub use password::{hash_password, verify_password, PasswordHashError};
pub use repo::note_repo::{NoteListQuery, NoteRecord, NoteRepository, SqliteNoteRepository};
pub use repo::user_repo::{
    RepoError, RepoResult, SqliteUserRepository, UserRecord, UserRepository,
};
pub use service::account_service::{AccountService, AccountServiceError};
pub use service::note_service::{NoteService, NoteServiceError};
