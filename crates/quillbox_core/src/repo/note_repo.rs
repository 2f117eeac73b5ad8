//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide note persistence APIs over the `notes` table.
//! - Own the owner-existence check for note creation with atomic semantics.
//!
//! # Invariants
//! - All read paths are constrained to `is_deleted = 0`; tombstoned ids are
//!   absent from the API surface.
//! - `create_note` verifies the owner inside the same immediate transaction
//!   as the insert; no note row survives a failed ownership check.
//! - `update_note` touches title/content/updated_at only; `id` and
//!   `owner_id` are never part of the SET clause.
//! - List order is `updated_at DESC, id ASC`.

use crate::model::note::{Note, NoteId};
use crate::model::user::UserId;
use crate::repo::user_repo::{ensure_user_schema_ready, RepoError, RepoResult};
use crate::repo::{require_columns, require_table};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    owner_id,
    expires_at,
    created_at,
    updated_at
FROM notes";

const NOTE_COLUMNS: &[&str] = &[
    "id",
    "title",
    "content",
    "owner_id",
    "expires_at",
    "is_deleted",
    "created_at",
    "updated_at",
];

/// Read model for note list/detail use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    /// Stable note id.
    pub id: NoteId,
    /// Short display title.
    pub title: String,
    /// Free-form body text.
    pub content: String,
    /// Owning user id.
    pub owner_id: UserId,
    /// Optional expiration instant in epoch milliseconds.
    pub expires_at: Option<i64>,
    /// Creation timestamp in epoch milliseconds.
    pub created_at: i64,
    /// Update timestamp in epoch milliseconds.
    pub updated_at: i64,
}

impl NoteRecord {
    /// Returns whether this note is expired at the given instant.
    ///
    /// A note with no `expires_at` never expires. The boundary instant
    /// itself counts as expired.
    pub fn is_expired_at(&self, now_epoch_ms: i64) -> bool {
        matches!(self.expires_at, Some(at) if at <= now_epoch_ms)
    }
}

/// Query options for listing notes.
///
/// The default query returns every live note; expired notes are NOT
/// filtered out unless `active_at` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteListQuery {
    /// Optional owner filter.
    pub owner: Option<UserId>,
    /// When set, excludes notes whose `expires_at` is at or before this
    /// instant (epoch milliseconds).
    pub active_at: Option<i64>,
    /// Maximum rows to return. `None` returns all matches.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: u32,
}

/// Repository interface for note CRUD operations.
pub trait NoteRepository {
    /// Creates one note and returns its stable id.
    ///
    /// Fails with `OwnerNotFound` when `note.owner_id` does not resolve to
    /// an existing user.
    fn create_note(&mut self, note: &Note) -> RepoResult<NoteId>;
    /// Gets one note by id.
    fn get_note(&self, id: NoteId) -> RepoResult<Option<NoteRecord>>;
    /// Lists notes using filter and pagination options.
    fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<NoteRecord>>;
    /// Replaces title and content of an existing note.
    fn update_note(&self, id: NoteId, title: &str, content: &str) -> RepoResult<()>;
    /// Removes one note by id.
    ///
    /// Fails with `NoteNotFound` when the id is already absent.
    fn delete_note(&self, id: NoteId) -> RepoResult<()>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_user_schema_ready(conn)?;
        ensure_note_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(&mut self, note: &Note) -> RepoResult<NoteId> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let owner_exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);",
            [note.owner_id.to_string()],
            |row| row.get(0),
        )?;
        if owner_exists != 1 {
            return Err(RepoError::OwnerNotFound(note.owner_id));
        }

        tx.execute(
            "INSERT INTO notes (id, title, content, owner_id, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                note.id.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                note.owner_id.to_string(),
                note.expires_at,
            ],
        )?;

        tx.commit()?;
        Ok(note.id)
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<NoteRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE id = ?1
               AND is_deleted = 0;"
        ))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }

    fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<NoteRecord>> {
        let mut sql = format!("{NOTE_SELECT_SQL} WHERE is_deleted = 0");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(owner) = query.owner {
            sql.push_str(" AND owner_id = ?");
            bind_values.push(Value::Text(owner.to_string()));
        }

        if let Some(active_at) = query.active_at {
            sql.push_str(" AND (expires_at IS NULL OR expires_at > ?)");
            bind_values.push(Value::Integer(active_at));
        }

        sql.push_str(" ORDER BY updated_at DESC, id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }

        Ok(notes)
    }

    fn update_note(&self, id: NoteId, title: &str, content: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET
                title = ?2,
                content = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND is_deleted = 0;",
            params![id.to_string(), title, content],
        )?;

        if changed == 0 {
            return Err(RepoError::NoteNotFound(id));
        }

        Ok(())
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        // Tombstone rather than DELETE; every read path filters the flag,
        // so the id is absent from the API surface afterwards.
        let changed = self.conn.execute(
            "UPDATE notes
             SET
                is_deleted = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND is_deleted = 0;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NoteNotFound(id));
        }

        Ok(())
    }
}

fn ensure_note_schema_ready(conn: &Connection) -> RepoResult<()> {
    require_table(conn, "notes")?;
    require_columns(conn, "notes", NOTE_COLUMNS)?;
    Ok(())
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<NoteRecord> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in notes.id"))
    })?;

    let owner_text: String = row.get("owner_id")?;
    let owner_id = Uuid::parse_str(&owner_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{owner_text}` in notes.owner_id"
        ))
    })?;

    Ok(NoteRecord {
        id,
        title: row.get("title")?,
        content: row.get("content")?,
        owner_id,
        expires_at: row.get("expires_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
