//! Liveness endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

pub const SERVICE_NAME: &str = "ticket-triage";

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub index_rows: usize,
}

fn report(state: &AppState) -> HealthResponse {
    HealthResponse {
        status: "healthy".into(),
        service: SERVICE_NAME.into(),
        version: env!("CARGO_PKG_VERSION").into(),
        index_rows: state.index_rows,
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(report(&state))
}

/// Same payload as `/health`.
#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn root(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(report(&state))
}
