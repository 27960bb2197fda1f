use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};
use triage_core::config::ActionsConfig;
use triage_core::{ActionKind, ActionResult, ActionStatus, InvoicePayload};

use crate::error::ActionError;
use crate::invoice::InvoiceClient;
use crate::remote::{remote_call, RemoteCall, Service};

/// Performs an approved action. Failures come back as an [`ActionResult`]
/// with a non-success status, never as an error.
#[async_trait]
pub trait ActionDispatcher: Send + Sync {
    async fn dispatch(
        &self,
        kind: ActionKind,
        query: &str,
        payload: Option<&InvoicePayload>,
    ) -> ActionResult;
}

/// Dispatcher that calls the order, customer and asset services and the
/// invoicing API over HTTP.
pub struct HttpActionDispatcher {
    client: reqwest::Client,
    order_service_url: String,
    customer_service_url: String,
    asset_service_url: String,
    invoices: InvoiceClient,
}

impl HttpActionDispatcher {
    pub fn new(config: &ActionsConfig) -> Result<Self, ActionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            invoices: InvoiceClient::new(
                client.clone(),
                config.invoice_base_url.clone(),
                config.invoice_api_key.clone(),
            ),
            client,
            order_service_url: config.order_service_url.clone(),
            customer_service_url: config.customer_service_url.clone(),
            asset_service_url: config.asset_service_url.clone(),
        })
    }

    fn base_url(&self, service: Service) -> &str {
        match service {
            Service::Order => &self.order_service_url,
            Service::Customer => &self.customer_service_url,
            Service::Asset => &self.asset_service_url,
        }
    }

    async fn post_identifier(
        &self,
        url: &str,
        id_field: &str,
        id: &str,
    ) -> Result<ActionResult, ActionError> {
        let body: serde_json::Map<String, Value> =
            std::iter::once((id_field.to_string(), Value::from(id))).collect();
        let response = self.client.post(url).json(&body).send().await?;
        let ok = response.status().is_success();
        let body = response.text().await?;
        Ok(interpret_response(ok, &body))
    }
}

#[async_trait]
impl ActionDispatcher for HttpActionDispatcher {
    async fn dispatch(
        &self,
        kind: ActionKind,
        query: &str,
        payload: Option<&InvoicePayload>,
    ) -> ActionResult {
        let Some(call) = remote_call(kind) else {
            warn!(action = %kind, "no remote mapping");
            return ActionResult::error(format!("No remote action mapped for action: {kind}"));
        };

        let result = match call {
            RemoteCall::Invoice => match payload {
                Some(payload) => self.invoices.create(payload).await,
                None => ActionResult::error("Invoice action requires payload"),
            },
            RemoteCall::Identifier {
                service,
                path,
                id_field,
            } => {
                let url = format!("{}{}", self.base_url(service), path);
                match self.post_identifier(&url, id_field, query.trim()).await {
                    Ok(result) => result,
                    Err(e) => {
                        warn!(action = %kind, %url, error = %e, "action call failed");
                        ActionResult::error(e.to_string())
                    }
                }
            }
        };

        info!(action = %kind, status = %result.status, "action dispatched");
        result
    }
}

/// Map a remote reply onto an [`ActionResult`]. A JSON body's own `status`
/// wins on 2xx; otherwise the HTTP status decides.
fn interpret_response(http_ok: bool, body: &str) -> ActionResult {
    let Ok(Value::Object(mut map)) = serde_json::from_str::<Value>(body) else {
        return if http_ok {
            ActionResult::success(body.trim())
        } else {
            ActionResult::failure(body.trim())
        };
    };

    let reported = map
        .remove("status")
        .and_then(|s| serde_json::from_value::<ActionStatus>(s).ok());
    let status = match (http_ok, reported) {
        (true, Some(status)) => status,
        (true, None) => ActionStatus::Success,
        (false, _) => ActionStatus::Failure,
    };
    let message = match map.remove("message") {
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => String::new(),
    };
    let invoice_id = map.remove("invoice_id").and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    });

    ActionResult {
        status,
        message,
        invoice_id,
        extra: map,
    }
}
