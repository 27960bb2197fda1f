//! Parsing model output into a decision or an invoice payload.

use serde_json::Value;
use thiserror::Error;
use triage_core::{truncate_chars, value_to_f64, IntendedAction, InvoicePayload};
use triage_llm::extract_json_object;

/// Characters of raw output kept alongside a parse failure.
pub const RAW_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Error, PartialEq)]
pub enum DecisionParseError {
    #[error("no JSON object found in model output")]
    NoJsonObject,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),
}

/// What the model proposed, before any policy is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDecision {
    pub action: IntendedAction,
    /// Clamped to `[0, 1]`.
    pub confidence: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecisionOutcome {
    Parsed(ModelDecision),
    ParseFailure { reason: String, raw_excerpt: String },
}

pub fn parse_decision(raw: &str) -> Result<ModelDecision, DecisionParseError> {
    let json = extract_json_object(raw).ok_or(DecisionParseError::NoJsonObject)?;
    let value: Value =
        serde_json::from_str(&json).map_err(|e| DecisionParseError::InvalidJson(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(DecisionParseError::InvalidJson("expected a JSON object".into()));
    };

    let action = match map.get("action") {
        Some(Value::String(name)) => IntendedAction::parse(name),
        Some(Value::Null) | None => IntendedAction::None,
        Some(other) => IntendedAction::parse(&other.to_string()),
    };
    let confidence = map
        .get("confidence")
        .and_then(value_to_f64)
        .filter(|c| c.is_finite())
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);
    let reasoning = map
        .get("reasoning")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    Ok(ModelDecision {
        action,
        confidence,
        reasoning,
    })
}

/// Tagged form of [`parse_decision`] carrying an excerpt on failure.
pub fn extract_decision(raw: &str) -> DecisionOutcome {
    match parse_decision(raw) {
        Ok(decision) => DecisionOutcome::Parsed(decision),
        Err(e) => DecisionOutcome::ParseFailure {
            reason: e.to_string(),
            raw_excerpt: truncate_chars(raw, RAW_EXCERPT_CHARS).to_string(),
        },
    }
}

/// Parse the invoice-extraction reply. The error string explains why the
/// payload cannot be used.
pub fn parse_invoice_payload(raw: &str) -> Result<InvoicePayload, String> {
    let json = extract_json_object(raw).ok_or("no invoice JSON found")?;
    let value: Value =
        serde_json::from_str(&json).map_err(|e| format!("invalid invoice JSON: {e}"))?;
    if let Some(err) = value.get("error") {
        return Err(format!("model reported {err}"));
    }
    if value.get("client_id").is_none() {
        return Err("missing client_id".into());
    }
    if value.get("line_items").is_none() {
        return Err("missing line_items".into());
    }
    let payload: InvoicePayload =
        serde_json::from_value(value).map_err(|e| format!("invalid invoice payload: {e}"))?;
    if payload.client_id.trim().is_empty() {
        return Err("empty client_id".into());
    }
    if payload.line_items.is_empty() {
        return Err("empty line_items".into());
    }
    Ok(payload)
}
