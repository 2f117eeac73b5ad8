//! User account use-case service.
//!
//! # Responsibility
//! - Provide registration, authentication and password rotation APIs.
//! - Keep plaintext passwords out of storage; hashing happens here.
//!
//! # Invariants
//! - Unknown-username and wrong-password failures are indistinguishable to
//!   callers: one `InvalidCredentials` value, and both paths pay one
//!   Argon2 verification.
//! - Log events carry metadata only, never usernames or password material.

use crate::model::user::{validate_username, User, UserId, UserValidationError};
use crate::password::{hash_password, verify_password, PasswordHashError};
use crate::repo::user_repo::{RepoError, UserRecord, UserRepository};
use log::info;
use once_cell::sync::Lazy;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Well-formed hash verified against when a username does not resolve,
/// so the miss costs the same work as a mismatch.
static ENUMERATION_GUARD_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("quillbox.enumeration.guard").ok());

/// Service error for account use-cases.
#[derive(Debug)]
pub enum AccountServiceError {
    /// Username is already taken by another account.
    DuplicateUsername(String),
    /// Username or password did not match; callers cannot tell which.
    InvalidCredentials,
    /// Target user does not exist.
    UserNotFound(UserId),
    /// Registration input failed validation.
    Validation(UserValidationError),
    /// Underlying hashing primitive failed.
    Password(PasswordHashError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for AccountServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateUsername(username) => {
                write!(f, "username already taken: `{username}`")
            }
            Self::InvalidCredentials => write!(f, "invalid username or password"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Password(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent account state: {details}")
            }
        }
    }
}

impl Error for AccountServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Password(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AccountServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateUsername(username) => Self::DuplicateUsername(username),
            RepoError::UserNotFound(id) => Self::UserNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<PasswordHashError> for AccountServiceError {
    fn from(value: PasswordHashError) -> Self {
        Self::Password(value)
    }
}

/// Account service facade over repository implementations.
pub struct AccountService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> AccountService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new account from a plaintext password.
    ///
    /// The password is hashed before any storage access; plaintext is never
    /// persisted. Fails with `DuplicateUsername` when the name is taken.
    pub fn register(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<UserRecord, AccountServiceError> {
        // Syntax errors must surface before any hashing work is paid for.
        validate_username(username).map_err(AccountServiceError::Validation)?;

        let password_hash = hash_password(password)?;
        let user = User::new(username, password_hash);
        let id = self.repo.create_user(&user)?;

        let record = self
            .repo
            .get_user(id)?
            .ok_or(AccountServiceError::InconsistentState(
                "registered user not found in read-back",
            ))?;
        info!("event=user_register module=account status=ok user_id={id}");
        Ok(record)
    }

    /// Authenticates a username/password pair.
    ///
    /// Failure to resolve the username and failure to match the password
    /// both yield `InvalidCredentials`.
    pub fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserRecord, AccountServiceError> {
        match self.repo.get_user_by_username(username)? {
            Some(user) if verify_password(password, &user.password_hash) => {
                info!(
                    "event=user_auth module=account status=ok user_id={}",
                    user.id
                );
                Ok(user)
            }
            Some(_) => {
                info!("event=user_auth module=account status=denied");
                Err(AccountServiceError::InvalidCredentials)
            }
            None => {
                if let Some(guard_hash) = ENUMERATION_GUARD_HASH.as_deref() {
                    let _ = verify_password(password, guard_hash);
                }
                info!("event=user_auth module=account status=denied");
                Err(AccountServiceError::InvalidCredentials)
            }
        }
    }

    /// Rotates the stored password hash for an existing account.
    pub fn change_password(
        &self,
        user_id: UserId,
        new_password: &str,
    ) -> Result<(), AccountServiceError> {
        let password_hash = hash_password(new_password)?;
        self.repo.update_password_hash(user_id, &password_hash)?;
        info!("event=password_rotate module=account status=ok user_id={user_id}");
        Ok(())
    }
}
