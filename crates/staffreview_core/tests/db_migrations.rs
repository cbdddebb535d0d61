use rusqlite::Connection;
use staffreview_core::db::migrations::latest_version;
use staffreview_core::db::{open_db, open_db_in_memory, table_exists, DbError};

#[test]
fn open_db_in_memory_creates_collaborator_tables_only() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert!(table_exists(&conn, "departments").unwrap());
    assert!(table_exists(&conn, "employees").unwrap());
    assert!(!table_exists(&conn, "reviews").unwrap());
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("staffreview.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO departments (name, location) VALUES ('Payroll', 'Building A');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let departments: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM departments;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(departments, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}
