use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::action::{ActionKind, IntendedAction};

/// Keyword-derived issue category for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Network,
    Crm,
    OrderMgmt,
    Billing,
    Unknown,
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueCategory::Network => write!(f, "network"),
            IssueCategory::Crm => write!(f, "crm"),
            IssueCategory::OrderMgmt => write!(f, "order_mgmt"),
            IssueCategory::Billing => write!(f, "billing"),
            IssueCategory::Unknown => write!(f, "unknown"),
        }
    }
}

/// Structured invoice body extracted from the query by a second model call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoicePayload {
    #[serde(deserialize_with = "string_or_number")]
    pub client_id: String,
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub product_key: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cost: f64,
    #[serde(default = "one", deserialize_with = "lenient_f64")]
    pub quantity: f64,
}

fn one() -> f64 {
    1.0
}

/// Final automation decision for one request.
///
/// `automation_allowed` is only ever true when the action is on the
/// allow-list, confidence clears the threshold, and invoice actions carry
/// a validated payload. Construct through the policy gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub automation_allowed: bool,
    pub approved_action: Option<ActionKind>,
    pub action: IntendedAction,
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
    pub reason: String,
    pub category: IssueCategory,
    #[serde(default)]
    pub payload: Option<InvoicePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_raw_output: Option<String>,
}

impl Decision {
    /// A decision that blocks automation before or without any model output.
    pub fn denied(category: IssueCategory, reason: impl Into<String>) -> Self {
        Self {
            automation_allowed: false,
            approved_action: None,
            action: IntendedAction::None,
            confidence: 0.0,
            reasoning: String::new(),
            reason: reason.into(),
            category,
            payload: None,
            llm_raw_output: None,
        }
    }
}

/// Accept a JSON number or a numeric string as `f64`.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    value_to_f64(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("expected number, got {value}")))
}

pub fn value_to_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected string id, got {other}"))),
    }
}
