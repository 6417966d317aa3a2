use articles_core::db::migrations::latest_version;
use articles_core::db::{open_db, open_db_in_memory, DbError};
use articles_core::{ConnectionFactory, DbConfig, ExecutionMode};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "authors");
    assert_table_exists(&conn, "magazines");
    assert_table_exists(&conn, "articles");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("articles.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "articles");
}

#[test]
fn migrations_accept_tables_created_by_hand() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE authors (id INTEGER PRIMARY KEY, name VARCHAR(255) NOT NULL);
         INSERT INTO authors (name) VALUES ('Legacy Writer');",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM authors;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
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

#[test]
fn factory_creates_data_dir_and_selects_store_by_mode() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("nested").join("data");

    let testing = ConnectionFactory::new(DbConfig::new(&data_dir, ExecutionMode::Testing));
    let conn = testing.acquire().unwrap();
    conn.execute("INSERT INTO authors (name) VALUES ('Only In Test');", [])
        .unwrap();
    drop(conn);

    assert!(data_dir.join("test_articles.db").exists());
    assert!(!data_dir.join("articles.db").exists());

    let production = ConnectionFactory::new(DbConfig::new(&data_dir, ExecutionMode::Production));
    let conn = production.acquire().unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM authors;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
    assert!(data_dir.join("articles.db").exists());
}

#[test]
fn factory_applies_foreign_key_setting() {
    let dir = tempfile::tempdir().unwrap();

    let enforced = ConnectionFactory::new(DbConfig::new(dir.path(), ExecutionMode::Testing));
    assert_eq!(foreign_keys(&enforced.acquire().unwrap()), 1);

    let relaxed = ConnectionFactory::new(
        DbConfig::new(dir.path(), ExecutionMode::Testing).with_foreign_keys(false),
    );
    assert_eq!(foreign_keys(&relaxed.acquire().unwrap()), 0);
}

#[test]
fn factory_rejects_a_file_that_is_not_a_database() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("articles.db"), vec![b'x'; 4096]).unwrap();

    let factory = ConnectionFactory::new(DbConfig::new(dir.path(), ExecutionMode::Production));
    assert!(factory.acquire().is_err());
}

#[test]
fn factory_reports_unusable_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("occupied");
    std::fs::write(&blocker, b"file, not a directory").unwrap();

    let factory = ConnectionFactory::new(DbConfig::new(&blocker, ExecutionMode::Production));
    let err = factory.acquire().unwrap_err();
    assert!(matches!(err, DbError::Io { .. }), "unexpected error: {err}");
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn foreign_keys(conn: &Connection) -> i64 {
    conn.query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
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
