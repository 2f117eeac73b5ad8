use quillbox_core::db::migrations::latest_version;
use quillbox_core::db::open_db_in_memory;
use quillbox_core::{
    AccountService, Note, NoteListQuery, NoteRepository, NoteService, NoteServiceError, RepoError,
    SqliteNoteRepository, SqliteUserRepository, UserId,
};
use rusqlite::{params, Connection};
use uuid::Uuid;

fn register_owner(conn: &mut Connection, username: &str) -> UserId {
    let repo = SqliteUserRepository::try_new(conn).unwrap();
    let mut accounts = AccountService::new(repo);
    accounts.register(username, "correct-horse").unwrap().id
}

#[test]
fn create_and_get_roundtrip() {
    let mut conn = open_db_in_memory().unwrap();
    let owner_id = register_owner(&mut conn, "alice");

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);

    let created = service
        .create_note(owner_id, "groceries", "milk, eggs", None)
        .unwrap();

    let loaded = service.get_note(created.id).unwrap();
    assert_eq!(loaded.id, created.id);
    assert_eq!(loaded.title, "groceries");
    assert_eq!(loaded.content, "milk, eggs");
    assert_eq!(loaded.owner_id, owner_id);
    assert_eq!(loaded.expires_at, None);
    assert!(loaded.created_at > 0);
    assert!(loaded.updated_at > 0);
}

#[test]
fn create_with_unknown_owner_fails_and_persists_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    let missing_owner = Uuid::new_v4();

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);

    let err = service
        .create_note(missing_owner, "orphan", "no owner", None)
        .unwrap_err();
    assert!(matches!(err, NoteServiceError::OwnerNotFound(id) if id == missing_owner));

    let listed = service.list_notes(&NoteListQuery::default()).unwrap();
    assert!(listed.is_empty());
}

#[test]
fn update_replaces_title_and_content_only() {
    let mut conn = open_db_in_memory().unwrap();
    let owner_id = register_owner(&mut conn, "alice");

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);

    let created = service
        .create_note(owner_id, "draft", "first version", None)
        .unwrap();
    let updated = service
        .update_note(created.id, "final", "second version")
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "final");
    assert_eq!(updated.content, "second version");
    assert_eq!(updated.owner_id, owner_id);
    assert_eq!(updated.created_at, created.created_at);
}

#[test]
fn update_missing_note_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let service = NoteService::new(repo);

    let missing = Uuid::new_v4();
    let err = service.update_note(missing, "title", "content").unwrap_err();
    assert!(matches!(err, NoteServiceError::NoteNotFound(id) if id == missing));
}

#[test]
fn update_after_delete_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let owner_id = register_owner(&mut conn, "alice");

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);

    let created = service
        .create_note(owner_id, "doomed", "to be deleted", None)
        .unwrap();
    service.delete_note(created.id).unwrap();

    let err = service
        .update_note(created.id, "ghost", "should fail")
        .unwrap_err();
    assert!(matches!(err, NoteServiceError::NoteNotFound(id) if id == created.id));
}

#[test]
fn delete_reports_not_found_when_already_absent() {
    let mut conn = open_db_in_memory().unwrap();
    let owner_id = register_owner(&mut conn, "alice");

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);

    let created = service
        .create_note(owner_id, "once", "delete me twice", None)
        .unwrap();

    service.delete_note(created.id).unwrap();
    let get_err = service.get_note(created.id).unwrap_err();
    assert!(matches!(get_err, NoteServiceError::NoteNotFound(id) if id == created.id));

    // Post-condition is unchanged, but the redundant call must still report
    // the absence instead of silently succeeding.
    let second_err = service.delete_note(created.id).unwrap_err();
    assert!(matches!(second_err, NoteServiceError::NoteNotFound(id) if id == created.id));

    let never_existed = service.delete_note(Uuid::new_v4()).unwrap_err();
    assert!(matches!(never_existed, NoteServiceError::NoteNotFound(_)));
}

#[test]
fn list_returns_stable_updated_at_desc_id_asc_order() {
    let mut conn = open_db_in_memory().unwrap();
    let owner_id = register_owner(&mut conn, "alice");

    let (first_id, second_id) = {
        let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
        let mut service = NoteService::new(repo);
        let first = service.create_note(owner_id, "first", "a", None).unwrap();
        let second = service.create_note(owner_id, "second", "b", None).unwrap();
        (first.id, second.id)
    };

    conn.execute(
        "UPDATE notes SET updated_at = 2000 WHERE id = ?1;",
        params![first_id.to_string()],
    )
    .unwrap();
    conn.execute(
        "UPDATE notes SET updated_at = 1000 WHERE id = ?1;",
        params![second_id.to_string()],
    )
    .unwrap();

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let service = NoteService::new(repo);
    let listed = service.list_notes(&NoteListQuery::default()).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, first_id);
    assert_eq!(listed[1].id, second_id);
}

#[test]
fn list_filters_by_owner() {
    let mut conn = open_db_in_memory().unwrap();
    let alice = register_owner(&mut conn, "alice");
    let bob = register_owner(&mut conn, "bob");

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);
    let alice_note = service.create_note(alice, "hers", "a", None).unwrap();
    service.create_note(bob, "his", "b", None).unwrap();

    let query = NoteListQuery {
        owner: Some(alice),
        ..NoteListQuery::default()
    };
    let listed = service.list_notes(&query).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, alice_note.id);
    assert_eq!(listed[0].owner_id, alice);
}

#[test]
fn list_pagination_with_limit_and_offset_is_stable() {
    let mut conn = open_db_in_memory().unwrap();
    let owner_id = register_owner(&mut conn, "alice");

    let note_a = note_with_fixed_id("00000000-0000-4000-8000-000000000001", owner_id);
    let note_b = note_with_fixed_id("00000000-0000-4000-8000-000000000002", owner_id);
    let note_c = note_with_fixed_id("00000000-0000-4000-8000-000000000003", owner_id);
    {
        let mut repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
        repo.create_note(&note_c).unwrap();
        repo.create_note(&note_a).unwrap();
        repo.create_note(&note_b).unwrap();
    }

    conn.execute("UPDATE notes SET updated_at = 1234567890000;", [])
        .unwrap();

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let service = NoteService::new(repo);

    let query = NoteListQuery {
        limit: Some(2),
        offset: 1,
        ..NoteListQuery::default()
    };
    let page = service.list_notes(&query).unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, note_b.id);
    assert_eq!(page[1].id, note_c.id);

    let offset_only = NoteListQuery {
        offset: 1,
        ..NoteListQuery::default()
    };
    let rest = service.list_notes(&offset_only).unwrap();
    assert_eq!(rest.len(), 2);
    assert_eq!(rest[0].id, note_b.id);
    assert_eq!(rest[1].id, note_c.id);
}

#[test]
fn note_lifecycle_end_to_end() {
    let mut conn = open_db_in_memory().unwrap();
    let alice = register_owner(&mut conn, "alice");

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);

    let note = service.create_note(alice, "T", "C", None).unwrap();
    assert_eq!(note.title, "T");
    assert_eq!(note.content, "C");
    assert_eq!(note.owner_id, alice);
    assert_eq!(note.expires_at, None);

    let listed = service.list_notes(&NoteListQuery::default()).unwrap();
    assert!(listed.iter().any(|item| item.id == note.id));

    service.delete_note(note.id).unwrap();
    let err = service.get_note(note.id).unwrap_err();
    assert!(matches!(err, NoteServiceError::NoteNotFound(id) if id == note.id));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let mut conn = Connection::open_in_memory().unwrap();

    let result = SqliteNoteRepository::try_new(&mut conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_notes_table() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE users (
            id TEXT PRIMARY KEY NOT NULL,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at INTEGER NOT NULL DEFAULT 0,
            updated_at INTEGER NOT NULL DEFAULT 0
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteNoteRepository::try_new(&mut conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("notes"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_users_column() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE users (
            id TEXT PRIMARY KEY NOT NULL,
            username TEXT NOT NULL UNIQUE
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteUserRepository::try_new(&mut conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "users",
            column: "password_hash"
        })
    ));
}

fn note_with_fixed_id(id: &str, owner_id: UserId) -> Note {
    Note::with_id(Uuid::parse_str(id).unwrap(), owner_id, "fixed", "body")
}
