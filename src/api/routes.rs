//! API route handlers.

use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::ApiError;
use super::state::AppState;
use crate::results::{self, TestResult, TestResultInput};
use crate::traffic;

// ---------------------------------------------------------------------------
// Service endpoints
// ---------------------------------------------------------------------------

/// `GET /` -- service info document.
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Bandmeter API",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/docs"
    }))
}

/// `GET /api/health` -- liveness check.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
    }))
}

// ---------------------------------------------------------------------------
// Test-traffic endpoints
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PingResponse {
    /// Server-side elapsed time in milliseconds.
    pub server_time: f64,
}

/// `GET /api/test/ping` -- latency test endpoint.
pub async fn ping(State(state): State<AppState>) -> Json<PingResponse> {
    let delay = Duration::from_millis(state.config.traffic.ping_delay_ms);
    let server_time = traffic::ping_elapsed_ms(delay).await;
    Json(PingResponse { server_time })
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    #[serde(default = "default_size_mb")]
    pub size_mb: u64,
}

fn default_size_mb() -> u64 {
    1
}

/// `POST /api/test/download?size_mb=N` -- download test endpoint.
///
/// Streams exactly `size_mb * 1024 * 1024` random bytes (after clamping to
/// the configured ceiling) with an exact `Content-Length` and cache-disabling
/// headers, so intermediaries cannot serve a cached payload and corrupt the
/// client's throughput measurement.
pub async fn download(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
) -> Result<Response, ApiError> {
    let cfg = &state.config.traffic;
    let size_mb = traffic::clamp_size_mb(params.size_mb, cfg.max_download_mb);
    let total_bytes = size_mb * 1024 * 1024;

    tracing::debug!(requested_mb = params.size_mb, served_mb = size_mb, "download test");

    let stream = traffic::payload_stream(total_bytes, cfg.chunk_size_bytes);
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, total_bytes)
        .header(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")
        .body(Body::from_stream(stream))?;
    Ok(response)
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub bytes_received: u64,
}

/// `POST /api/test/upload` -- upload test endpoint.
///
/// Consumes the request body to completion and reports the byte count. The
/// only contract is correctness of the count; the payload itself is discarded.
pub async fn upload(body: Body) -> Result<Json<UploadResponse>, ApiError> {
    let mut stream = body.into_data_stream();
    let mut bytes_received: u64 = 0;
    while let Some(chunk) = stream.next().await {
        bytes_received += chunk?.len() as u64;
    }

    tracing::debug!(bytes_received, "upload test");
    Ok(Json(UploadResponse { bytes_received }))
}

// ---------------------------------------------------------------------------
// Results endpoints
// ---------------------------------------------------------------------------

/// `POST /api/results/` -- persist a client-reported measurement.
///
/// SQLite calls block, and a contended write can wait out the full busy
/// timeout, so all store operations run on the blocking pool rather than an
/// executor thread.
pub async fn create_result(
    State(state): State<AppState>,
    Json(input): Json<TestResultInput>,
) -> Result<(StatusCode, Json<TestResult>), ApiError> {
    let pool = state.pool.clone();
    let record = tokio::task::spawn_blocking(move || results::create(&pool, &input)).await??;
    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    results::DEFAULT_LIST_LIMIT
}

/// `GET /api/results/?skip=&limit=` -- list records, most recent first.
pub async fn list_results(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<TestResult>>, ApiError> {
    let pool = state.pool.clone();
    let records =
        tokio::task::spawn_blocking(move || results::list(&pool, params.skip, params.limit))
            .await??;
    Ok(Json(records))
}

/// `GET /api/results/{id}` -- fetch one record.
pub async fn get_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TestResult>, ApiError> {
    let pool = state.pool.clone();
    let record = tokio::task::spawn_blocking(move || results::get(&pool, &id)).await??;
    Ok(Json(record))
}

/// `DELETE /api/results/{id}` -- remove one record.
pub async fn delete_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let pool = state.pool.clone();
    tokio::task::spawn_blocking(move || results::delete(&pool, &id)).await??;
    Ok(StatusCode::NO_CONTENT)
}
