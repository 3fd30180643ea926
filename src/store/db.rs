// Stockbot - SQLite Database Management
//
// Opens the stock database and creates the `accounts` table. When a
// password is configured the file is encrypted with SQLCipher and the key
// is set via PRAGMA before any table is touched. Opening never touches the
// schema; `migrate` runs once at startup.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, ErrorCode};

use super::StoreError;

/// How long a connection waits on another writer before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Wrapper around a single SQLite connection.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path`. With `password` set the file
    /// is treated as a SQLCipher database keyed by that passphrase.
    pub fn open(path: &Path, password: Option<&str>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        if let Some(password) = password {
            conn.pragma_update(None, "key", password)?;
        }

        // A wrong key only shows up once the schema is read.
        conn.execute_batch("SELECT count(*) FROM sqlite_master;")
            .map_err(key_check_error)?;

        Ok(Self { conn })
    }

    /// Open an in-memory database (unencrypted, for testing only).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Create the schema if missing. AUTOINCREMENT keeps ids from ever being
    /// reissued after a claim.
    pub fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS accounts (
                id       INTEGER PRIMARY KEY AUTOINCREMENT,
                service  TEXT NOT NULL,
                account  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_accounts_service
                ON accounts(service);
            ",
        )?;

        tracing::debug!("Database migrations completed successfully");
        Ok(())
    }
}

/// Only "file is not a database" means the key is wrong; a busy lock or an
/// I/O failure is reported as is.
fn key_check_error(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::NotADatabase => {
            StoreError::InvalidKey
        }
        _ => StoreError::Database(err),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory_succeeds() {
        let db = Database::open_in_memory();
        assert!(db.is_ok(), "Should be able to open an in-memory database");
    }

    #[test]
    fn test_schema_migration_creates_accounts_table() {
        let db = Database::open_in_memory().unwrap();

        let count: i64 = db
            .conn()
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name='accounts'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1, "accounts table should exist");
    }

    #[test]
    fn test_schema_migration_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.migrate().is_ok(), "Migrations should be idempotent");
    }

    #[test]
    fn test_plain_db_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.db");

        assert!(Database::open(&path, None).is_ok());
        assert!(path.exists());
    }

    #[test]
    fn test_open_leaves_schema_to_migrate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.db");
        let tables = |db: &Database| -> i64 {
            db.conn()
                .query_row(
                    "SELECT count(*) FROM sqlite_master WHERE name='accounts'",
                    [],
                    |row| row.get(0),
                )
                .unwrap()
        };

        let db = Database::open(&path, None).unwrap();
        assert_eq!(tables(&db), 0, "Plain open must not create tables");

        db.migrate().unwrap();
        assert_eq!(tables(&Database::open(&path, None).unwrap()), 1);
    }

    #[test]
    fn test_encrypted_db_wrong_password_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.db");

        {
            let db = Database::open(&path, Some("correct horse")).unwrap();
            db.migrate().unwrap();
            db.conn()
                .execute(
                    "INSERT INTO accounts (service, account) VALUES ('netflix', 'a:b')",
                    [],
                )
                .unwrap();
        }

        assert!(Database::open(&path, Some("correct horse")).is_ok());
        assert!(
            matches!(
                Database::open(&path, Some("battery staple")),
                Err(StoreError::InvalidKey)
            ),
            "Opening with the wrong password must fail"
        );
    }

    #[test]
    fn test_busy_database_is_not_reported_as_wrong_key() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(matches!(key_check_error(busy), StoreError::Database(_)));

        let not_a_db = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_NOTADB),
            None,
        );
        assert!(matches!(key_check_error(not_a_db), StoreError::InvalidKey));
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn();

        conn.execute("INSERT INTO accounts (service, account) VALUES ('x', 'a:1')", [])
            .unwrap();
        let first = conn.last_insert_rowid();
        conn.execute("DELETE FROM accounts WHERE id = ?1", [first]).unwrap();
        conn.execute("INSERT INTO accounts (service, account) VALUES ('x', 'a:2')", [])
            .unwrap();

        assert!(conn.last_insert_rowid() > first);
    }
}
