//! OpenAPI document for the triage API, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ticket-triage API",
        version = "0.1.0",
        description = "Incident triage with policy-gated remediation and ticket updates.",
    ),
    tags(
        (name = "Health", description = "Liveness and index size"),
        (name = "Incident", description = "Run the triage pipeline for one incident"),
    ),
    paths(
        super::health::root,
        super::health::health,
        super::incident::incident,
    ),
    components(schemas(
        super::HealthResponse,
        super::ErrorResponse,
        super::IncidentRequest,
    ))
)]
pub struct ApiDoc;
