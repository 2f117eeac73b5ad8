//! User repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide user persistence APIs over the `users` table.
//! - Own the username uniqueness check with atomic semantics.
//! - Define the shared repository error taxonomy.
//!
//! # Invariants
//! - Write paths must call `User::validate()` before SQL mutations.
//! - The duplicate-username check and the insert share one immediate
//!   transaction.
//! - Read paths must reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::note::NoteId;
use crate::model::user::{User, UserId, UserValidationError};
use crate::repo::{ensure_schema_current, require_columns, require_table};
use rusqlite::{params, Connection, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT
    id,
    username,
    password_hash,
    created_at,
    updated_at
FROM users";

const USER_COLUMNS: &[&str] = &["id", "username", "password_hash", "created_at", "updated_at"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for user/note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(UserValidationError),
    Db(DbError),
    NoteNotFound(NoteId),
    UserNotFound(UserId),
    /// Referenced note owner was absent at creation time.
    OwnerNotFound(UserId),
    DuplicateUsername(String),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::OwnerNotFound(id) => write!(f, "note owner not found: {id}"),
            Self::DuplicateUsername(username) => {
                write!(f, "username already taken: `{username}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; run migrations first"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UserValidationError> for RepoError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Read model for user lookup use-cases.
///
/// Carries the store-maintained timestamps in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Stable user id.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Salted one-way digest in PHC string format.
    pub password_hash: String,
    /// Creation timestamp in epoch milliseconds.
    pub created_at: i64,
    /// Update timestamp in epoch milliseconds.
    pub updated_at: i64,
}

/// Repository interface for user account operations.
pub trait UserRepository {
    /// Creates one user and returns its stable id.
    ///
    /// Fails with `DuplicateUsername` when the username is already taken.
    fn create_user(&mut self, user: &User) -> RepoResult<UserId>;
    /// Gets one user by id.
    fn get_user(&self, id: UserId) -> RepoResult<Option<UserRecord>>;
    /// Gets one user by exact username.
    fn get_user_by_username(&self, username: &str) -> RepoResult<Option<UserRecord>>;
    /// Replaces the stored password hash for an existing user.
    fn update_password_hash(&self, id: UserId, password_hash: &str) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_user_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&mut self, user: &User) -> RepoResult<UserId> {
        user.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let taken: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1);",
            [user.username.as_str()],
            |row| row.get(0),
        )?;
        if taken == 1 {
            return Err(RepoError::DuplicateUsername(user.username.clone()));
        }

        tx.execute(
            "INSERT INTO users (id, username, password_hash) VALUES (?1, ?2, ?3);",
            params![
                user.id.to_string(),
                user.username.as_str(),
                user.password_hash.as_str(),
            ],
        )?;

        tx.commit()?;
        Ok(user.id)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<UserRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn get_user_by_username(&self, username: &str) -> RepoResult<Option<UserRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE username = ?1;"))?;
        let mut rows = stmt.query([username])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn update_password_hash(&self, id: UserId, password_hash: &str) -> RepoResult<()> {
        if password_hash.is_empty() {
            return Err(RepoError::Validation(
                UserValidationError::EmptyPasswordHash,
            ));
        }

        let changed = self.conn.execute(
            "UPDATE users
             SET
                password_hash = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), password_hash],
        )?;

        if changed == 0 {
            return Err(RepoError::UserNotFound(id));
        }

        Ok(())
    }
}

pub(crate) fn ensure_user_schema_ready(conn: &Connection) -> RepoResult<()> {
    ensure_schema_current(conn)?;
    require_table(conn, "users")?;
    require_columns(conn, "users", USER_COLUMNS)?;
    Ok(())
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<UserRecord> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in users.id"))
    })?;

    Ok(UserRecord {
        id,
        username: row.get("username")?,
        password_hash: row.get("password_hash")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
