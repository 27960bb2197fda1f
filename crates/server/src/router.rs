//! HTTP router construction.

use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api;
use crate::state::AppState;

/// Fails when `CORS_ORIGIN` is neither `*` nor a valid origin header value.
pub fn build_router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let cors = cors_layer(&state.config.server.cors_origin)?;
    Ok(Router::new()
        .route("/", get(api::root))
        .route("/health", get(api::health))
        .route("/incident", post(api::incident))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi())))
}

fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin = origin.trim();
    if origin == "*" {
        return Ok(CorsLayer::permissive());
    }
    let value = origin
        .parse::<HeaderValue>()
        .with_context(|| format!("invalid CORS_ORIGIN {origin:?}"))?;
    Ok(CorsLayer::permissive().allow_origin(AllowOrigin::exact(value)))
}
