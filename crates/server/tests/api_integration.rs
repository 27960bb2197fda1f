//! Router-level tests: requests go through the real axum router into a
//! pipeline wired with scripted model, embedder, dispatcher and ticket doubles.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Map, Value};
use tower::ServiceExt;

use triage_actions::ActionDispatcher;
use triage_agent::{DecisionEngine, Pipeline, PolicyGate, SuggestionGenerator};
use triage_core::{ActionKind, ActionResult, Config, InvoicePayload};
use triage_llm::{LlmClient, LlmError, LlmProvider, Message, PromptLibrary};
use triage_retrieval::{write_index, Embedder, EmbeddingError, IndexRecord, Retriever, VectorIndex};
use triage_server::{build_router, AppState};
use triage_ticket::{Reconciler, TicketClient};

// ── Test doubles ─────────────────────────────────────────────────

/// Approves `update_order` at high confidence; everything else is prose.
struct OrderModel {
    calls: Mutex<usize>,
}

#[async_trait]
impl LlmProvider for OrderModel {
    async fn complete(
        &self,
        messages: Vec<Message>,
        _temperature: f32,
        _max_tokens: u32,
    ) -> Result<String, LlmError> {
        *self.calls.lock().unwrap() += 1;
        let prompt = &messages[0].content;
        if prompt.contains("You MUST reply in EXACT JSON only") {
            Ok(
                r#"{"action": "update_order", "confidence": 0.97, "reasoning": "order stuck"}"#
                    .into(),
            )
        } else if prompt.contains("Predict the most appropriate assignment group") {
            Ok("Order Management".into())
        } else {
            Ok("1. Retry the order\n2. Confirm in OSM".into())
        }
    }

    fn name(&self) -> &str {
        "order-model"
    }
}

struct AxisEmbedder;

#[async_trait]
impl Embedder for AxisEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
    }

    fn dimensions(&self) -> usize {
        2
    }

    fn name(&self) -> &str {
        "axis"
    }
}

#[derive(Default)]
struct CountingDispatcher {
    calls: Mutex<Vec<ActionKind>>,
}

#[async_trait]
impl ActionDispatcher for CountingDispatcher {
    async fn dispatch(
        &self,
        kind: ActionKind,
        _query: &str,
        _payload: Option<&InvoicePayload>,
    ) -> ActionResult {
        self.calls.lock().unwrap().push(kind);
        ActionResult::success("Order retried")
    }
}

#[derive(Default)]
struct AcceptingTickets {
    patched: Mutex<Vec<String>>,
}

#[async_trait]
impl TicketClient for AcceptingTickets {
    async fn patch(&self, ticket_id: &str, _fields: Map<String, Value>) -> (bool, Value) {
        self.patched.lock().unwrap().push(ticket_id.to_string());
        (true, json!({"result": {"sys_id": ticket_id}}))
    }
}

struct Harness {
    app: Router,
    model: Arc<OrderModel>,
    dispatcher: Arc<CountingDispatcher>,
    tickets: Arc<AcceptingTickets>,
    _dir: tempfile::TempDir,
}

fn harness() -> Harness {
    harness_with_origin("*").unwrap()
}

fn harness_with_origin(cors_origin: &str) -> anyhow::Result<Harness> {
    let dir = tempfile::tempdir().unwrap();
    write_index(
        dir.path(),
        2,
        &[
            (
                vec![1.0, 0.0],
                IndexRecord {
                    id: Some("INC42".into()),
                    source: Some("incident".into()),
                    training_text: Some("Order fallout retried".into()),
                    assignment_group: Some("Order Management".into()),
                    ..Default::default()
                },
            ),
            (
                vec![0.0, 1.0],
                IndexRecord {
                    id: Some("KB1".into()),
                    source: Some("kb_article".into()),
                    training_text: Some("How to retry orders".into()),
                    ..Default::default()
                },
            ),
        ],
    )
    .unwrap();
    let index = Arc::new(VectorIndex::open(dir.path()).unwrap());
    let retriever = Retriever::new(index, Arc::new(AxisEmbedder)).unwrap();

    let model = Arc::new(OrderModel { calls: Mutex::new(0) });
    let llm = LlmClient::new(model.clone(), 0.0, 256);
    let prompts = Arc::new(PromptLibrary::new());
    let dispatcher = Arc::new(CountingDispatcher::default());
    let tickets = Arc::new(AcceptingTickets::default());

    let pipeline = Pipeline::new(
        retriever,
        SuggestionGenerator::new(llm.clone(), prompts.clone()),
        DecisionEngine::new(llm, prompts, PolicyGate::new(0.9)),
        dispatcher.clone(),
        Reconciler::new(tickets.clone(), "u_ai_suggestion", 0.9),
    );
    let mut config = Config::for_profile("");
    config.server.cors_origin = cors_origin.into();

    Ok(Harness {
        app: build_router(Arc::new(AppState::new(pipeline, config)))?,
        model,
        dispatcher,
        tickets,
        _dir: dir,
    })
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_incident(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/incident")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// ── Health ───────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_index_rows() {
    let h = harness();
    for uri in ["/", "/health"] {
        let (status, body) = send(&h.app, get(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["index_rows"], 2);
        assert!(body["version"].is_string());
    }
}

#[tokio::test]
async fn configured_origin_is_echoed() {
    let h = harness_with_origin("https://desk.example.com").unwrap();
    let request = Request::builder()
        .uri("/health")
        .header("origin", "https://desk.example.com")
        .body(Body::empty())
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://desk.example.com"
    );
}

#[test]
fn unparseable_cors_origin_fails_startup() {
    let err = harness_with_origin("https://desk.example.com\nx").err().unwrap();
    assert!(err.to_string().contains("invalid CORS_ORIGIN"));
}

#[tokio::test]
async fn docs_are_served() {
    let h = harness();
    let response = h.app.clone().oneshot(get("/docs")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ── Incident ─────────────────────────────────────────────────────

#[tokio::test]
async fn blank_or_missing_query_is_rejected() {
    let h = harness();
    for body in [json!({"query": "   "}), json!({"configuration_item": "OSM"})] {
        let (status, body) = send(&h.app, post_incident(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"status": "error", "message": "Query required"}));
    }
    assert_eq!(*h.model.calls.lock().unwrap(), 0);
    assert!(h.dispatcher.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_bodies_get_the_error_shape() {
    let h = harness();
    let json = "application/json";
    let cases = [
        (json, r#"{"query": "#, StatusCode::BAD_REQUEST),
        (json, r#"{"query": "ORD-1", "top_k": "three"}"#, StatusCode::UNPROCESSABLE_ENTITY),
        (json, r#"{"query": "ORD-1", "ticket_id": 42}"#, StatusCode::UNPROCESSABLE_ENTITY),
        ("text/plain", r#"{"query": "ORD-1"}"#, StatusCode::UNSUPPORTED_MEDIA_TYPE),
    ];
    for (content_type, raw, expected) in cases {
        let request = Request::builder()
            .method("POST")
            .uri("/incident")
            .header("content-type", content_type)
            .body(Body::from(raw))
            .unwrap();
        let (status, body) = send(&h.app, request).await;
        assert_eq!(status, expected, "{raw}");
        assert_eq!(body["status"], "error");
        assert!(!body["message"].as_str().unwrap().is_empty());
    }
    assert_eq!(*h.model.calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn network_incident_is_refused_without_acting() {
    let h = harness();
    let (status, body) = send(
        &h.app,
        post_incident(json!({"query": "VPN not connecting", "configuration_item": "Sie-CRM"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["decision_engine"]["automation_allowed"], false);
    assert!(body["decision_engine"]["reason"]
        .as_str()
        .unwrap()
        .to_lowercase()
        .contains("network"));
    assert_eq!(body["automation_triggered"], false);
    assert!(body["action_result"].is_null());
    assert!(body.get("ticket_update_status").is_none());
    assert!(h.dispatcher.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn approved_order_action_resolves_the_ticket() {
    let h = harness();
    let (status, body) = send(
        &h.app,
        post_incident(json!({
            "query": "ORD-778",
            "configuration_item": "OSM",
            "sys_id": "abc123",
            "top_k": 1
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "ORD-778");
    assert_eq!(body["similar_items"].as_array().unwrap().len(), 1);
    assert_eq!(body["similar_items"][0]["id"], "INC42");
    assert_eq!(body["assignment_group"], "Order Management");
    assert_eq!(body["decision_engine"]["automation_allowed"], true);
    assert_eq!(body["automation_triggered"], true);
    assert_eq!(body["action_result"]["status"], "success");
    assert_eq!(body["ticket_ai_field_update_ok"], true);
    assert_eq!(body["ticket_update_status"], "resolved");

    assert_eq!(*h.dispatcher.calls.lock().unwrap(), vec![ActionKind::UpdateOrder]);
    assert!(h.tickets.patched.lock().unwrap().iter().all(|id| id == "abc123"));
}
