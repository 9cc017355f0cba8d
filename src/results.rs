//! Results store -- persisted bandwidth-test records and their four
//! operations: create, list, get, delete.
//!
//! Records are immutable after creation. There is no update path; a record
//! is either present or absent. Every operation takes the connection pool
//! explicitly and performs a single read or write on one pooled connection.

use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::storage::Pool;

/// Default page size for [`list`].
pub const DEFAULT_LIST_LIMIT: u32 = 100;

#[derive(Debug, Error)]
pub enum ResultsError {
    #[error("{0}")]
    Validation(String),

    #[error("result not found")]
    NotFound,

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// A persisted bandwidth-test record.
///
/// `id` and `timestamp` are generated server-side at creation; the numeric
/// fields echo the client-reported measurement exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestResult {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Download throughput in Mbps.
    pub download_speed: f64,
    /// Upload throughput in Mbps.
    pub upload_speed: f64,
    /// Round-trip latency in ms.
    pub latency: f64,
    /// Latency variance in ms, reported by the client.
    pub jitter: f64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Client submission for a new test result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResultInput {
    pub download_speed: f64,
    pub upload_speed: f64,
    pub latency: f64,
    pub jitter: f64,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl TestResultInput {
    /// Check the create-time invariant: all four numeric fields must be
    /// non-negative. Runs before any write so an invalid submission never
    /// touches the database.
    pub fn validate(&self) -> Result<(), ResultsError> {
        for (name, value) in [
            ("download_speed", self.download_speed),
            ("upload_speed", self.upload_speed),
            ("latency", self.latency),
            ("jitter", self.jitter),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ResultsError::Validation(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Validate the input, generate an id and creation timestamp, persist the
/// record, and return it in full.
pub fn create(pool: &Pool, input: &TestResultInput) -> Result<TestResult, ResultsError> {
    input.validate()?;

    let record = TestResult {
        id: Uuid::new_v4().to_string(),
        timestamp: creation_timestamp(),
        download_speed: input.download_speed,
        upload_speed: input.upload_speed,
        latency: input.latency,
        jitter: input.jitter,
        ip_address: input.ip_address.clone(),
        user_agent: input.user_agent.clone(),
    };

    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO test_results
             (id, timestamp, download_speed, upload_speed, latency, jitter,
              ip_address, user_agent)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            record.id,
            encode_timestamp(&record.timestamp),
            record.download_speed,
            record.upload_speed,
            record.latency,
            record.jitter,
            record.ip_address,
            record.user_agent,
        ],
    )?;

    tracing::debug!(id = %record.id, "test result created");
    Ok(record)
}

/// List records ordered by timestamp descending (most recent first).
///
/// Ties on timestamp fall back to insertion order, newest first. An
/// out-of-range `skip` yields an empty page, never an error.
pub fn list(pool: &Pool, skip: u32, limit: u32) -> Result<Vec<TestResult>, ResultsError> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(
        "SELECT id, timestamp, download_speed, upload_speed, latency, jitter,
                ip_address, user_agent
         FROM test_results
         ORDER BY timestamp DESC, rowid DESC
         LIMIT ?1 OFFSET ?2",
    )?;

    let rows = stmt.query_map(rusqlite::params![limit, skip], row_to_record)?;
    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}

/// Fetch a single record by id.
pub fn get(pool: &Pool, id: &str) -> Result<TestResult, ResultsError> {
    let conn = pool.get()?;
    let record = conn
        .query_row(
            "SELECT id, timestamp, download_speed, upload_speed, latency, jitter,
                    ip_address, user_agent
             FROM test_results
             WHERE id = ?1",
            rusqlite::params![id],
            row_to_record,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => ResultsError::NotFound,
            other => ResultsError::Database(other),
        })?;
    Ok(record)
}

/// Delete a single record by id. The transition is one-way; deleting an
/// unknown (or already-deleted) id is `NotFound`.
pub fn delete(pool: &Pool, id: &str) -> Result<(), ResultsError> {
    let conn = pool.get()?;
    let affected = conn.execute(
        "DELETE FROM test_results WHERE id = ?1",
        rusqlite::params![id],
    )?;

    if affected == 0 {
        return Err(ResultsError::NotFound);
    }

    tracing::debug!(%id, "test result deleted");
    Ok(())
}

/// Encode a timestamp as a fixed-width RFC 3339 string so that lexicographic
/// order in SQLite matches chronological order.
fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time truncated to microseconds, the precision the store encodes.
/// The record handed back at creation must equal the one a later `get` reads.
fn creation_timestamp() -> DateTime<Utc> {
    let now = Utc::now();
    now.with_nanosecond(now.nanosecond() / 1000 * 1000)
        .unwrap_or(now)
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<TestResult> {
    let raw_ts: String = row.get(1)?;
    let timestamp = DateTime::parse_from_rfc3339(&raw_ts)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?
        .with_timezone(&Utc);

    Ok(TestResult {
        id: row.get(0)?,
        timestamp,
        download_speed: row.get(2)?,
        upload_speed: row.get(3)?,
        latency: row.get(4)?,
        jitter: row.get(5)?,
        ip_address: row.get(6)?,
        user_agent: row.get(7)?,
    })
}
