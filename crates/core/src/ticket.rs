use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of write issued against an incident record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketUpdateKind {
    /// Internal work note only.
    Worknote,
    /// Move to Resolved with close notes.
    Resolve,
    /// Keep In Progress and hand to a human.
    Escalate,
}

/// Terminal reconciliation path for a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileOutcome {
    Resolved,
    ResolveFailed,
    Escalated,
    EscalateFailed,
}

impl ReconcileOutcome {
    pub fn for_resolve(ok: bool) -> Self {
        if ok {
            ReconcileOutcome::Resolved
        } else {
            ReconcileOutcome::ResolveFailed
        }
    }

    pub fn for_escalate(ok: bool) -> Self {
        if ok {
            ReconcileOutcome::Escalated
        } else {
            ReconcileOutcome::EscalateFailed
        }
    }
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileOutcome::Resolved => write!(f, "resolved"),
            ReconcileOutcome::ResolveFailed => write!(f, "resolve_failed"),
            ReconcileOutcome::Escalated => write!(f, "escalated"),
            ReconcileOutcome::EscalateFailed => write!(f, "escalate_failed"),
        }
    }
}

/// Everything written to the ticketing system for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketUpdate {
    pub ticket_id: String,
    pub ticket_ai_field_update_ok: bool,
    pub ticket_ai_field_update_resp: serde_json::Value,
    pub ticket_update_status: ReconcileOutcome,
    pub ticket_update_response: serde_json::Value,
    pub ticket_update_note: String,
}
