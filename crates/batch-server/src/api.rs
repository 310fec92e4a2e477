use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use fairdraw_core::{RangeConfig, Session, SessionError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state: the single session behind the one lock that serializes
/// every operation (each handler holds it for the whole call, and no await
/// happens while it is held).
pub struct AppState {
    pub session: Mutex<Session>,
}

#[derive(Deserialize)]
pub struct GenerateRequest {
    pub n: u32,
    #[serde(default = "default_k")]
    pub k: u32,
    #[serde(default = "default_start")]
    pub start: i64,
}

fn default_k() -> u32 {
    fairdraw_core::config::DEFAULT_K
}

fn default_start() -> i64 {
    fairdraw_core::config::DEFAULT_START
}

#[derive(Serialize)]
struct GenerateResponse {
    message: String,
    batch: Vec<i64>,
    table: Vec<(i64, u64)>,
}

#[derive(Serialize)]
struct DisplayResponse {
    message: String,
    table: Vec<(i64, u64)>,
}

#[derive(Serialize)]
struct FullStateResponse {
    message: String,
    table: Vec<(i64, u64)>,
    n: u32,
    k: u32,
    start: i64,
}

impl FullStateResponse {
    fn new(message: String, table: Vec<(i64, u64)>, range: RangeConfig) -> Self {
        Self {
            message,
            table,
            n: range.n,
            k: range.k,
            start: range.start,
        }
    }
}

fn error_response(err: SessionError) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"error": err.to_string()})),
    )
}

/// POST /api/generate — draw a fair batch and advance the counts.
pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateRequest>,
) -> impl IntoResponse {
    let mut session = state.session.lock();
    match session.generate(body.n, body.k, body.start) {
        Ok(outcome) => {
            tracing::info!(
                n = body.n,
                k = body.k,
                start = body.start,
                batch = ?outcome.batch,
                "batch generated"
            );
            Json(GenerateResponse {
                message: outcome.message,
                batch: outcome.batch,
                table: outcome.table,
            })
            .into_response()
        }
        Err(err) => {
            tracing::warn!(n = body.n, k = body.k, error = %err, "generate rejected");
            error_response(err).into_response()
        }
    }
}

/// POST /api/reset — clear counts, restore the default range.
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut session = state.session.lock();
    let full = session.reset();
    tracing::info!("session reset");
    Json(FullStateResponse::new(full.message, full.table, full.range))
}

/// POST /api/clean — drop counts outside the current range.
pub async fn clean_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut session = state.session.lock();
    let outcome = session.clean();
    tracing::info!(message = %outcome.message, "clean");
    Json(DisplayResponse {
        message: outcome.message,
        table: outcome.table,
    })
}

/// GET /api/state — current table and range, no mutation.
pub async fn state_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.session.lock();
    Json(FullStateResponse::new(
        String::new(),
        session.table(),
        session.range(),
    ))
}

/// GET /api/progress/counts — counts-only JSON snapshot (quick save).
pub async fn export_counts_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.session.lock().export_counts()
}

/// GET /api/progress/full — full JSON snapshot.
pub async fn export_full_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.session.lock().export_full()
}

/// POST /api/progress/counts — restore counts from a snapshot body. The
/// caller is responsible for delivering UTF-8 JSON text.
pub async fn import_counts_handler(
    State(state): State<Arc<AppState>>,
    body: String,
) -> impl IntoResponse {
    let mut session = state.session.lock();
    match session.import_counts(&body) {
        Ok(outcome) => {
            tracing::info!(entries = outcome.table.len(), "counts restored");
            Json(DisplayResponse {
                message: outcome.message,
                table: outcome.table,
            })
            .into_response()
        }
        Err(err) => {
            tracing::warn!(error = %err, "counts import rejected");
            error_response(err).into_response()
        }
    }
}

/// POST /api/progress/full — restore counts and range from a snapshot body.
pub async fn import_full_handler(
    State(state): State<Arc<AppState>>,
    body: String,
) -> impl IntoResponse {
    let mut session = state.session.lock();
    match session.import_full(&body) {
        Ok(full) => {
            tracing::info!(
                entries = full.table.len(),
                n = full.range.n,
                k = full.range.k,
                start = full.range.start,
                "full progress restored"
            );
            Json(FullStateResponse::new(full.message, full.table, full.range)).into_response()
        }
        Err(err) => {
            tracing::warn!(error = %err, "full import rejected");
            error_response(err).into_response()
        }
    }
}
