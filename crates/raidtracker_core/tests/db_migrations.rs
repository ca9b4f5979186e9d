use raidtracker_core::db::migrations::latest_version;
use raidtracker_core::db::{open_db, open_db_in_memory, DbError};
use raidtracker_core::{KeyValueStore, SqliteKvStore};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "kv_entries");
}

#[test]
fn reopening_database_keeps_schema_and_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raidtracker.sqlite3");

    let conn_first = open_db(&path).unwrap();
    SqliteKvStore::new(&conn_first)
        .set("raidtracker-last-visit", "1700000000000")
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let value = SqliteKvStore::new(&conn_second)
        .get("raidtracker-last-visit")
        .unwrap();
    assert_eq!(value.as_deref(), Some("1700000000000"));
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

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

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
