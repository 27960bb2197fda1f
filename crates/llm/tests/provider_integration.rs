//! Providers against in-process stand-ins for each vendor's completion API.

use std::sync::Arc;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use triage_llm::providers::claude::ClaudeProvider;
use triage_llm::providers::gemini::GeminiProvider;
use triage_llm::providers::ollama::OllamaProvider;
use triage_llm::providers::openai::OpenAiProvider;
use triage_llm::{LlmClient, LlmError, LlmProvider, Message};

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn header(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn groq_speaks_openai_chat_completions() {
    let app = Router::new().route(
        "/openai/v1/chat/completions",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            assert_eq!(header(&headers, "authorization"), "Bearer gsk_test");
            assert_eq!(body["model"], "llama-3.1-8b-instant");
            assert_eq!(body["temperature"], 0.0);
            assert_eq!(body["messages"][0]["content"], "Order ORD-9 stuck");
            let message = json!({"role": "assistant", "content": "Retry the order."});
            Json(json!({"choices": [{"message": message}]}))
        }),
    );
    let base = spawn(app).await;

    let provider = OpenAiProvider::groq(
        "gsk_test".into(),
        "llama-3.1-8b-instant".into(),
        format!("{base}/openai"),
    );
    let client = LlmClient::new(Arc::new(provider), 0.0, 1024);
    assert_eq!(
        client.complete_prompt("Order ORD-9 stuck").await.unwrap(),
        "Retry the order."
    );
}

#[tokio::test]
async fn non_success_status_is_an_api_error_with_body() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async { (StatusCode::TOO_MANY_REQUESTS, "rate limited") }),
    );
    let base = spawn(app).await;

    let provider = OpenAiProvider::new("k".into(), "gpt-4o-mini".into(), base);
    let err = provider.complete(vec![Message::user("x")], 0.0, 16).await.unwrap_err();
    match err {
        LlmError::ApiError { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn reply_without_text_is_a_parse_error() {
    let app = Router::new().route("/api/chat", post(|| async { Json(json!({"done": true})) }));
    let base = spawn(app).await;

    let provider = OllamaProvider::new(base, "llama3.2".into());
    let err = provider.complete(vec![Message::user("x")], 0.0, 16).await.unwrap_err();
    assert!(matches!(err, LlmError::ParseError(_)));
}

#[tokio::test]
async fn ollama_chat_reads_message_content() {
    let app = Router::new().route(
        "/api/chat",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["stream"], false);
            Json(json!({"message": {"role": "assistant", "content": "{\"action\": \"none\"}"}}))
        }),
    );
    let base = spawn(app).await;

    let provider = OllamaProvider::new(format!("{base}/"), "llama3.2".into());
    let out = provider.complete(vec![Message::user("vague")], 0.0, 64).await.unwrap();
    assert_eq!(out, "{\"action\": \"none\"}");
}

#[tokio::test]
async fn claude_sends_version_header_and_reads_first_block() {
    let app = Router::new().route(
        "/v1/messages",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            assert_eq!(header(&headers, "x-api-key"), "sk-ant");
            assert_eq!(header(&headers, "anthropic-version"), "2023-06-01");
            assert_eq!(body["system"], "json only");
            Json(json!({"content": [{"type": "text", "text": "escalate"}]}))
        }),
    );
    let base = spawn(app).await;

    let provider = ClaudeProvider::with_base_url("sk-ant".into(), "claude-3-haiku".into(), base);
    let out = provider
        .complete(vec![Message::system("json only"), Message::user("x")], 0.0, 64)
        .await
        .unwrap();
    assert_eq!(out, "escalate");
}

#[tokio::test]
async fn gemini_generate_content_path_includes_model() {
    let app = Router::new().route(
        "/v1beta/models/{model}",
        post(|Path(model): Path<String>, headers: HeaderMap| async move {
            assert_eq!(model, "gemini-2.0-flash-lite:generateContent");
            assert_eq!(header(&headers, "x-goog-api-key"), "g-key");
            let content = json!({"parts": [{"text": "1. Sync the profile"}]});
            Json(json!({"candidates": [{"content": content}]}))
        }),
    );
    let base = spawn(app).await;

    let provider =
        GeminiProvider::with_base_url("g-key".into(), "gemini-2.0-flash-lite".into(), base);
    let out = provider.complete(vec![Message::user("x")], 0.0, 64).await.unwrap();
    assert_eq!(out, "1. Sync the profile");
}
