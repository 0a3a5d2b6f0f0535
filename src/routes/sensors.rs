// src/routes/sensors.rs
//! Reading ingestion and query endpoints.
//!
//! - `POST /sensors` ingests one reading
//! - `GET  /sensors/{sensorId}` returns the newest readings for a sensor
//! - `GET  /sensors/data?sensor_id=..&last_evaluated_key=..` is the paginated
//!   read used by the dashboard
//!
//! Any other method on these paths is answered with 400. CORS headers and
//! `OPTIONS` preflights are handled by the router's `CorsLayer`.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::AppState;
use crate::cursor::Cursor;
use crate::error::{ApiError, ValidationError};
use crate::ingest::{self, Ack};
use crate::query::{self, Page};
use crate::Config;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/sensors", post(ingest_reading).fallback(unsupported))
        .route("/sensors/data", get(paged_readings).fallback(unsupported))
        .route(
            "/sensors/{sensor_id}",
            get(sensor_readings).fallback(unsupported),
        )
}

/// Query parameters for `GET /sensors/data`.
#[derive(Debug, Deserialize)]
struct PagedParams {
    sensor_id: Option<String>,
    last_evaluated_key: Option<String>,
    limit: Option<String>,
}

/// Query parameters for `GET /sensors/{sensorId}`.
#[derive(Debug, Deserialize)]
struct SensorParams {
    last_evaluated_key: Option<String>,
    limit: Option<String>,
}

/// Handle `POST /sensors`.
async fn ingest_reading(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Ack>, ApiError> {
    // ---
    let body = body?;
    info!("POST /sensors - {} bytes", body.len());

    let (ack, _) = ingest::ingest(
        &body,
        state.store.as_ref(),
        state.archive.as_ref(),
        Utc::now(),
    )
    .await?;

    Ok(Json(ack))
}

/// Handle `GET /sensors/data`.
async fn paged_readings(
    State(state): State<AppState>,
    params: Result<Query<PagedParams>, QueryRejection>,
) -> Result<Json<Page>, ApiError> {
    // ---
    let Query(params) = params?;
    info!("GET /sensors/data - {:?}", params);

    let sensor_id = params.sensor_id.unwrap_or_default();
    let page_size = resolve_page_size(params.limit.as_deref(), &state.config)?;
    let cursor = client_cursor(params.last_evaluated_key);

    let page = query::query(state.store.as_ref(), &sensor_id, cursor.as_ref(), page_size).await?;
    Ok(Json(page))
}

/// Handle `GET /sensors/{sensorId}`.
async fn sensor_readings(
    State(state): State<AppState>,
    sensor_id: Result<Path<String>, PathRejection>,
    params: Result<Query<SensorParams>, QueryRejection>,
) -> Result<Json<Page>, ApiError> {
    // ---
    let Path(sensor_id) = sensor_id?;
    let Query(params) = params?;
    info!("GET /sensors/{}", sensor_id);

    let page_size = resolve_page_size(params.limit.as_deref(), &state.config)?;
    let cursor = client_cursor(params.last_evaluated_key);

    let page = query::query(state.store.as_ref(), &sensor_id, cursor.as_ref(), page_size).await?;
    Ok(Json(page))
}

pub async fn unsupported() -> ApiError {
    ApiError::UnsupportedMethod
}

/// An empty token means "first page", matching what the dashboard sends.
fn client_cursor(token: Option<String>) -> Option<Cursor> {
    token.filter(|t| !t.is_empty()).map(Cursor::new)
}

fn resolve_page_size(limit: Option<&str>, config: &Config) -> Result<u32, ValidationError> {
    // ---
    match limit {
        None => Ok(config.page_size),
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(n) if (1..=config.max_page_size).contains(&n) => Ok(n),
            _ => Err(ValidationError::InvalidLimit),
        },
    }
}
