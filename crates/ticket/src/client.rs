//! Incident updates through the ServiceNow Table API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Url;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{info, warn};
use triage_core::config::TicketingConfig;
use triage_core::TicketUpdateKind;

pub const STATE_IN_PROGRESS: u8 = 2;
pub const STATE_RESOLVED: u8 = 6;

pub const MISSING_CONFIG: &str =
    "Missing SERVICENOW_INSTANCE / SERVICENOW_USERNAME / SERVICENOW_PASSWORD env vars";

#[derive(Debug, Error)]
pub enum TicketError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Writes to incident records. Every call reports `(ok, response)` where
/// `response` is the remote JSON body, its raw text, or an error object.
#[async_trait]
pub trait TicketClient: Send + Sync {
    async fn patch(&self, ticket_id: &str, fields: Map<String, Value>) -> (bool, Value);

    async fn update_ticket(
        &self,
        ticket_id: &str,
        kind: TicketUpdateKind,
        message: &str,
    ) -> (bool, Value) {
        self.patch(ticket_id, update_fields(kind, message)).await
    }

    /// Set arbitrary fields and add a work note in one write.
    async fn set_fields_and_note(
        &self,
        ticket_id: &str,
        fields: Map<String, Value>,
        note: &str,
    ) -> (bool, Value) {
        let mut fields = fields;
        fields.insert("work_notes".into(), Value::from(note));
        self.patch(ticket_id, fields).await
    }
}

/// Field set written for each update kind.
pub fn update_fields(kind: TicketUpdateKind, message: &str) -> Map<String, Value> {
    let body = match kind {
        TicketUpdateKind::Worknote => json!({ "work_notes": message }),
        TicketUpdateKind::Resolve => json!({
            "state": STATE_RESOLVED,
            "close_notes": message,
            "work_notes": format!("Resolution details:\n{message}"),
        }),
        TicketUpdateKind::Escalate => json!({
            "state": STATE_IN_PROGRESS,
            "work_notes": format!("Escalated to human: {message}"),
        }),
    };
    match body {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Table API record URL for one incident. The id always lands as a single
/// escaped path segment under `incident`.
pub fn incident_url(instance: &str, ticket_id: &str) -> Result<Url, String> {
    let id = ticket_id.trim();
    if id.is_empty() || id.chars().all(|c| c == '.') {
        return Err(format!("Invalid ticket id: {ticket_id:?}"));
    }
    let mut url = Url::parse(instance.trim())
        .map_err(|e| format!("Invalid SERVICENOW_INSTANCE {instance:?}: {e}"))?;
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| format!("Invalid SERVICENOW_INSTANCE {instance:?}: not a base URL"))?
        .pop_if_empty()
        .extend(["api", "now", "table", "incident", id]);
    Ok(url)
}

pub struct ServiceNowClient {
    client: reqwest::Client,
    instance: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

impl ServiceNowClient {
    pub fn new(config: &TicketingConfig) -> Result<Self, TicketError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            instance: config.instance.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }
}

#[async_trait]
impl TicketClient for ServiceNowClient {
    async fn patch(&self, ticket_id: &str, fields: Map<String, Value>) -> (bool, Value) {
        let (Some(instance), Some(username), Some(password)) =
            (&self.instance, &self.username, &self.password)
        else {
            return (
                false,
                json!({
                    "error": MISSING_CONFIG,
                    "instance": self.instance.clone().unwrap_or_default(),
                    "user_set": self.username.is_some(),
                    "password_set": self.password.is_some(),
                }),
            );
        };

        let url = match incident_url(instance, ticket_id) {
            Ok(url) => url,
            Err(message) => {
                warn!(ticket_id, %message, "refusing ticket update");
                return (false, json!({ "error": message }));
            }
        };
        info!(ticket_id, fields = ?fields.keys().collect::<Vec<_>>(), "patching incident");

        let response = match self
            .client
            .patch(url)
            .basic_auth(username, Some(password))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&fields)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(ticket_id, error = %e, "ticketing request failed");
                return (
                    false,
                    json!({ "error": format!("Network error updating ServiceNow: {e}") }),
                );
            }
        };

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let mut body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));

        let ok = status.is_success();
        if !ok {
            warn!(ticket_id, %status, "ticketing system rejected update");
            if let Value::Object(map) = &mut body {
                map.entry("http_status").or_insert(json!(status.as_u16()));
            }
        }
        (ok, body)
    }
}
