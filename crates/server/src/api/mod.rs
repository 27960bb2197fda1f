//! HTTP endpoints. Shared response types live here.

pub mod doc;
mod health;
mod incident;

use serde::Serialize;

pub use health::{health, root, HealthResponse};
pub use incident::{incident, IncidentRequest};

// ── Shared types ─────────────────────────────────────────────────

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".into(),
            message: message.into(),
        }
    }
}
