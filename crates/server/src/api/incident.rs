//! The triage endpoint: one request runs the whole pipeline.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};

use triage_agent::TriageReport;
use triage_core::{IncidentQuery, TriageError, DEFAULT_TOP_K};

use super::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct IncidentRequest {
    /// Free-text problem description.
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub configuration_item: Option<String>,
    /// Ticket to update. `sys_id` is accepted as an alias.
    #[serde(default)]
    pub ticket_id: Option<String>,
    #[serde(default)]
    pub sys_id: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

impl IncidentRequest {
    pub fn into_query(self) -> IncidentQuery {
        let ticket = non_blank(self.ticket_id).or_else(|| non_blank(self.sys_id));
        let mut query = IncidentQuery::new(self.query)
            .with_configuration_item(self.configuration_item.unwrap_or_default())
            .with_top_k(self.top_k.unwrap_or(DEFAULT_TOP_K));
        if let Some(ticket) = ticket {
            query = query.with_ticket(ticket);
        }
        query
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[utoipa::path(
    post,
    path = "/incident",
    tag = "Incident",
    request_body = IncidentRequest,
    responses(
        (status = 200, description = "Triage report and ticket outcome", body = Object),
        (status = 400, description = "Query blank or body not JSON", body = ErrorResponse),
        (status = 415, description = "Body is not sent as application/json", body = ErrorResponse),
        (status = 422, description = "A field has the wrong type", body = ErrorResponse)
    )
)]
pub async fn incident(
    State(state): State<Arc<AppState>>,
    body: Result<Json<IncidentRequest>, JsonRejection>,
) -> Result<Json<TriageReport>, (StatusCode, Json<ErrorResponse>)> {
    let Json(req) = body.map_err(|rejection| {
        warn!(
            status = %rejection.status(),
            error = %rejection.body_text(),
            "rejected incident body"
        );
        (rejection.status(), Json(ErrorResponse::new(rejection.body_text())))
    })?;
    let query = req.into_query();
    info!(
        ci = %query.configuration_item,
        ticket_id = query.ticket_id.as_deref().unwrap_or("-"),
        top_k = query.top_k,
        "incident received"
    );

    match state.pipeline.run(&query).await {
        Ok(report) => Ok(Json(report)),
        Err(TriageError::EmptyQuery) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Query required")),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )),
    }
}
