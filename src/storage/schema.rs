//! Database schema and migrations.

use anyhow::Result;
use rusqlite::Connection;

/// Run all pending migrations.
pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS test_results (
            id TEXT PRIMARY KEY,
            timestamp TEXT NOT NULL,
            download_speed REAL NOT NULL,
            upload_speed REAL NOT NULL,
            latency REAL NOT NULL,
            jitter REAL NOT NULL,
            ip_address TEXT,
            user_agent TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_test_results_timestamp
            ON test_results(timestamp);",
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_creates_tables() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        // Verify tables exist by querying them
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM test_results", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap(); // Should not error
    }

    #[test]
    fn test_optional_columns_accept_null() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        conn.execute(
            "INSERT INTO test_results
                 (id, timestamp, download_speed, upload_speed, latency, jitter)
             VALUES ('a', '2026-01-01T00:00:00.000000Z', 0.0, 0.0, 0.0, 0.0)",
            [],
        )
        .unwrap();

        let (ip, ua): (Option<String>, Option<String>) = conn
            .query_row(
                "SELECT ip_address, user_agent FROM test_results WHERE id = 'a'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert!(ip.is_none());
        assert!(ua.is_none());
    }
}
