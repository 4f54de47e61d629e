use pubdesk::contract::SessionStore;
use pubdesk::session::{FileSessionStore, Session, UserRecord};
use tempfile::tempdir;

fn session() -> Session {
    Session {
        token: "tok".to_string(),
        user: UserRecord {
            id: "u1".to_string(),
            name: "Admin".to_string(),
            email: "admin@example.com".to_string(),
            role: Some("editor".to_string()),
        },
    }
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let store = FileSessionStore::new(dir.path().join("session.json"));

    assert!(store.load().is_none());
    store.save(session());
    assert_eq!(store.load(), Some(session()));
}

#[test]
fn clear_removes_the_session() {
    let dir = tempdir().unwrap();
    let store = FileSessionStore::new(dir.path().join("session.json"));

    store.save(session());
    store.clear();
    assert!(store.load().is_none());
    // Clearing an already-cleared store is fine.
    store.clear();
}

#[test]
fn creates_missing_parent_directories() {
    let dir = tempdir().unwrap();
    let store = FileSessionStore::new(dir.path().join("nested/deeper/session.json"));

    store.save(session());
    assert_eq!(store.load(), Some(session()));
}

#[test]
fn corrupt_session_file_reads_as_signed_out() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{not json").unwrap();

    let store = FileSessionStore::new(path);
    assert!(store.load().is_none());
}
