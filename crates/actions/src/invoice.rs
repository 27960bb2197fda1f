//! Client for the invoicing API (`POST {NINJA_URL}/invoices`).

use reqwest::StatusCode;
use serde_json::Value;
use tracing::{info, warn};
use triage_core::{ActionResult, InvoicePayload};

use crate::error::ActionError;

pub const INVOICE_CREATED: &str = "Invoice created successfully";

#[derive(Clone)]
pub struct InvoiceClient {
    client: reqwest::Client,
    base_url: Option<String>,
    api_key: Option<String>,
}

impl InvoiceClient {
    pub fn new(client: reqwest::Client, base_url: Option<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    pub async fn create(&self, payload: &InvoicePayload) -> ActionResult {
        match self.send(payload).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "invoice request failed");
                ActionResult::error(e.to_string())
            }
        }
    }

    async fn send(&self, payload: &InvoicePayload) -> Result<ActionResult, ActionError> {
        let (Some(base_url), Some(api_key)) = (&self.base_url, &self.api_key) else {
            return Err(ActionError::NotConfigured(
                "NINJA_URL and NINJAINVOICE_API_KEY must be set".into(),
            ));
        };

        let response = self
            .client
            .post(format!("{base_url}/invoices"))
            .header("X-API-TOKEN", api_key)
            .header("X-Requested-With", "XMLHttpRequest")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            warn!(%status, "invoice API rejected request");
            return Ok(ActionResult::failure(body));
        }

        let mut result = ActionResult::success(INVOICE_CREATED);
        result.invoice_id = serde_json::from_str::<Value>(&body)
            .ok()
            .as_ref()
            .and_then(invoice_id);
        info!(invoice_id = result.invoice_id.as_deref().unwrap_or("-"), "invoice created");
        Ok(result)
    }
}

/// `id` at the top level, or under `data` as the v5 API nests it.
fn invoice_id(body: &Value) -> Option<String> {
    let id = body.get("id").or_else(|| body.get("data").and_then(|d| d.get("id")))?;
    match id {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
