//! Schema initialization for the SQLite backend.
//!
//! The schema carries an explicit version. Initialization is idempotent and
//! refuses to touch a database written by a newer build.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::error::{StoreError, StoreResult};

/// Schema version this build reads and writes.
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

const SCHEMA_V1: &str = "
CREATE TABLE users (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    username       TEXT NOT NULL UNIQUE,
    wallet_address TEXT UNIQUE,
    created_at     TEXT NOT NULL
);

CREATE TABLE wishes (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    title           TEXT NOT NULL CHECK (length(title) BETWEEN 1 AND 100),
    timestamp       TEXT NOT NULL,
    pubkey          TEXT NOT NULL DEFAULT '',
    wallet_address  TEXT,
    signature       TEXT,
    status          TEXT NOT NULL DEFAULT 'pending',
    total_donations INTEGER NOT NULL DEFAULT 0 CHECK (total_donations >= 0),
    user_id         INTEGER REFERENCES users(id)
);

CREATE INDEX idx_wishes_timestamp ON wishes(timestamp DESC, id DESC);

CREATE TABLE donations (
    id                    INTEGER PRIMARY KEY AUTOINCREMENT,
    wish_id               INTEGER NOT NULL REFERENCES wishes(id),
    sender_wallet_address TEXT NOT NULL,
    amount                INTEGER NOT NULL CHECK (amount > 0),
    signature             TEXT,
    timestamp             TEXT NOT NULL,
    status                TEXT NOT NULL DEFAULT 'pending'
);

CREATE INDEX idx_donations_wish ON donations(wish_id, timestamp DESC);
";

/// Bring the database up to [`CURRENT_SCHEMA_VERSION`].
///
/// Safe to call on every start.
pub fn initialize_schema(conn: &mut Connection) -> StoreResult<()> {
    let version = schema_version(conn)?;

    if version == CURRENT_SCHEMA_VERSION {
        return Ok(());
    }
    if version > CURRENT_SCHEMA_VERSION {
        return Err(StoreError::Schema(format!(
            "schema version {version} is newer than supported {CURRENT_SCHEMA_VERSION}"
        )));
    }

    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_V1)?;
    tx.execute(
        "INSERT INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
        params![CURRENT_SCHEMA_VERSION],
    )?;
    tx.commit()?;

    info!(version = CURRENT_SCHEMA_VERSION, "applied store schema");
    Ok(())
}

/// Current schema version; 0 for a fresh database.
pub fn schema_version(conn: &Connection) -> StoreResult<i64> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );",
    )?;
    let version: Option<i64> = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
        .optional()?
        .flatten();
    Ok(version.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_is_initialized() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 0);
        initialize_schema(&mut conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'wishes', 'donations')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);
    }

    #[test]
    fn initialization_is_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        initialize_schema(&mut conn).unwrap();
        initialize_schema(&mut conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn newer_schema_is_refused() {
        let mut conn = Connection::open_in_memory().unwrap();
        schema_version(&conn).unwrap();
        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (99, 'later')",
            [],
        )
        .unwrap();
        assert!(matches!(
            initialize_schema(&mut conn),
            Err(StoreError::Schema(_))
        ));
    }
}
