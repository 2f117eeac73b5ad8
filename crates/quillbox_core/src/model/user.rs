//! User account domain model.
//!
//! # Responsibility
//! - Define the canonical user record created at registration.
//! - Own username syntax rules enforced before any storage access.
//!
//! # Invariants
//! - `id` is stable and never reused for another user.
//! - `password_hash` holds an opaque salted digest, never a raw password.
//! - `password_hash` is excluded from serialized output.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a user account.
pub type UserId = Uuid;

/// Accepted username shape: 3-32 chars, alphanumeric plus `._-`,
/// starting with an alphanumeric character.
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9._-]{2,31}$").expect("valid username regex"));

/// Validation error for user creation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Username does not match the accepted syntax.
    InvalidUsername(String),
    /// Password hash must never be empty when persisting a user.
    EmptyPasswordHash,
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUsername(username) => write!(f, "invalid username: `{username}`"),
            Self::EmptyPasswordHash => write!(f, "password hash cannot be empty"),
        }
    }
}

impl Error for UserValidationError {}

/// Canonical user record created at registration.
///
/// Store-maintained timestamps live on the repository read model
/// ([`crate::repo::user_repo::UserRecord`]), not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable global ID used for note ownership references.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Salted one-way digest in PHC string format.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

impl User {
    /// Creates a new user with a generated stable ID.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), username, password_hash)
    }

    /// Creates a user with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(
        id: UserId,
        username: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }

    /// Checks creation invariants before persistence.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        validate_username(&self.username)?;
        if self.password_hash.is_empty() {
            return Err(UserValidationError::EmptyPasswordHash);
        }
        Ok(())
    }
}

/// Validates username syntax without constructing a [`User`].
pub fn validate_username(username: &str) -> Result<(), UserValidationError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(UserValidationError::InvalidUsername(username.to_string()))
    }
}
