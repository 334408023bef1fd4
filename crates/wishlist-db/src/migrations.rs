use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub const LATEST_VERSION: i64 = 2;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (accounts and wishes)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                email       TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password    TEXT NOT NULL,
                full_name   TEXT,
                created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE wishes (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name        TEXT NOT NULL,
                link        TEXT,
                notes       TEXT,
                priority    INTEGER CHECK (priority BETWEEN 1 AND 5),
                reserved_by TEXT,
                created_at  TEXT NOT NULL
            );

            CREATE INDEX idx_wishes_owner ON wishes(user_id, created_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    if version < 2 {
        // Reservations used to be recorded by name only.
        info!("Running migration v2 (reserver identity)");
        conn.execute_batch(
            "
            ALTER TABLE wishes ADD COLUMN reserved_by_id TEXT REFERENCES users(id) ON DELETE SET NULL;

            INSERT INTO schema_version (version) VALUES (2);
            ",
        )?;
    }

    Ok(())
}
