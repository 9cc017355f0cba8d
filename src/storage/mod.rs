//! SQLite storage layer -- connection pool, pragmas, migrations.

pub mod schema;

use std::path::Path;

use anyhow::{Context, Result};
use r2d2::Pool as R2D2Pool;
use r2d2_sqlite::SqliteConnectionManager;

/// Connection pool type.
pub type Pool = R2D2Pool<SqliteConnectionManager>;

/// Open (or create) the SQLite database and return a connection pool.
///
/// The parent directory and database file are created on first startup if
/// absent, and migrations are applied before the pool is handed out.
pub fn open_pool(path: &Path) -> Result<Pool> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory: {}", parent.display())
            })?;
        }
    }

    let manager = SqliteConnectionManager::file(path).with_init(|c| {
        c.execute_batch(
            "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA temp_store = MEMORY;
                 PRAGMA busy_timeout = 5000;",
        )
    });

    let pool = R2D2Pool::new(manager)?;

    // Run migrations on a single connection
    let conn = pool.get()?;
    schema::migrate(&conn)?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_pool_creates_file_and_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("bandmeter.db");

        let pool = open_pool(&path).unwrap();
        assert!(path.exists());

        // Schema should be usable straight away.
        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM test_results", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_open_pool_is_reopenable() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bandmeter.db");

        {
            let pool = open_pool(&path).unwrap();
            let conn = pool.get().unwrap();
            conn.execute(
                "INSERT INTO test_results
                     (id, timestamp, download_speed, upload_speed, latency, jitter)
                 VALUES ('x', '2026-01-01T00:00:00.000000Z', 1.0, 1.0, 1.0, 1.0)",
                [],
            )
            .unwrap();
        }

        // Reopening the same file must see the persisted row.
        let pool = open_pool(&path).unwrap();
        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM test_results", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
