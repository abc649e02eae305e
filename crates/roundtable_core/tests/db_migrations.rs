use roundtable_core::db::migrations::latest_version;
use roundtable_core::db::{open_db, open_db_in_memory, DbError, BUSY_TIMEOUT};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in [
        "admins",
        "admin_sessions",
        "candidates",
        "slots",
        "slot_admins",
        "slot_candidates",
    ] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn reopening_a_file_database_keeps_schema_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roundtable.db");

    let first = open_db(&path).unwrap();
    first
        .execute(
            "INSERT INTO slots (uuid, round, time_ms) VALUES ('s-1', 1, 0);",
            [],
        )
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    let count: i64 = second
        .query_row("SELECT COUNT(*) FROM slots;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
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

#[test]
fn connections_enforce_foreign_keys_and_round_range() {
    let conn = open_db_in_memory().unwrap();

    let dangling = conn.execute(
        "INSERT INTO slot_candidates (slot_uuid, candidate_uuid, position)
         VALUES ('missing-slot', 'missing-candidate', 0);",
        [],
    );
    assert!(dangling.is_err());

    let bad_round = conn.execute(
        "INSERT INTO slots (uuid, round, time_ms) VALUES ('s-9', 4, 0);",
        [],
    );
    assert!(bad_round.is_err());
}

#[test]
fn busy_timeout_is_applied() {
    let conn = open_db_in_memory().unwrap();
    let timeout_ms: i64 = conn
        .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(timeout_ms, BUSY_TIMEOUT.as_millis() as i64);
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
