use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TriageError;

/// Remote fix actions a model may name in its decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateOrder,
    UpdateOrder,
    RetryOrder,
    CreateInvoice,
    UpdateInvoice,
    RestartServer,
    SyncCustomerData,
    FixAssetMismatch,
}

/// Actions eligible for unattended execution.
pub const AUTO_APPROVED_ACTIONS: &[ActionKind] = &[
    ActionKind::CreateOrder,
    ActionKind::UpdateOrder,
    ActionKind::CreateInvoice,
    ActionKind::UpdateInvoice,
    ActionKind::RestartServer,
    ActionKind::SyncCustomerData,
];

impl ActionKind {
    pub const ALL: &'static [ActionKind] = &[
        ActionKind::CreateOrder,
        ActionKind::UpdateOrder,
        ActionKind::RetryOrder,
        ActionKind::CreateInvoice,
        ActionKind::UpdateInvoice,
        ActionKind::RestartServer,
        ActionKind::SyncCustomerData,
        ActionKind::FixAssetMismatch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::CreateOrder => "create_order",
            ActionKind::UpdateOrder => "update_order",
            ActionKind::RetryOrder => "retry_order",
            ActionKind::CreateInvoice => "create_invoice",
            ActionKind::UpdateInvoice => "update_invoice",
            ActionKind::RestartServer => "restart_server",
            ActionKind::SyncCustomerData => "sync_customer_data",
            ActionKind::FixAssetMismatch => "fix_asset_mismatch",
        }
    }

    pub fn is_auto_approved(&self) -> bool {
        AUTO_APPROVED_ACTIONS.contains(self)
    }

    /// Invoice actions need a structured payload before they may run.
    pub fn requires_payload(&self) -> bool {
        matches!(self, ActionKind::CreateInvoice | ActionKind::UpdateInvoice)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        ActionKind::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == normalized)
            .ok_or_else(|| TriageError::UnknownAction(s.to_string()))
    }
}

/// What the model said it intends to do. Unrecognised names are kept
/// verbatim for diagnostics but can never be dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum IntendedAction {
    None,
    Known(ActionKind),
    Unknown(String),
}

impl IntendedAction {
    pub fn parse(name: &str) -> Self {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
            return IntendedAction::None;
        }
        match trimmed.parse::<ActionKind>() {
            Ok(kind) => IntendedAction::Known(kind),
            Err(_) => IntendedAction::Unknown(trimmed.to_string()),
        }
    }

    pub fn kind(&self) -> Option<ActionKind> {
        match self {
            IntendedAction::Known(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            IntendedAction::None => "none",
            IntendedAction::Known(kind) => kind.as_str(),
            IntendedAction::Unknown(name) => name,
        }
    }
}

impl From<String> for IntendedAction {
    fn from(s: String) -> Self {
        IntendedAction::parse(&s)
    }
}

impl From<IntendedAction> for String {
    fn from(a: IntendedAction) -> Self {
        a.name().to_string()
    }
}

impl fmt::Display for IntendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome status of a remote action call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Success,
    Error,
    /// Any non-success status reported by the remote, including `failure`.
    #[serde(other)]
    Failure,
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionStatus::Success => write!(f, "success"),
            ActionStatus::Failure => write!(f, "failure"),
            ActionStatus::Error => write!(f, "error"),
        }
    }
}

/// Result of one dispatched action. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub status: ActionStatus,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    /// Anything else the remote put in its JSON body.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ActionResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ActionStatus::Success,
            message: message.into(),
            invoice_id: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: ActionStatus::Failure,
            message: message.into(),
            invoice_id: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ActionStatus::Error,
            message: message.into(),
            invoice_id: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ActionStatus::Success
    }
}
