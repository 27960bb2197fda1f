//! Maps an automation outcome onto ticket writes: the suggestion field is
//! always stored, then the ticket is either resolved or escalated.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::info;
use triage_core::{
    ActionResult, ActionStatus, Decision, ReconcileOutcome, Suggestion, TicketUpdate,
    TicketUpdateKind,
};

use crate::client::TicketClient;

pub struct Reconciler {
    client: Arc<dyn TicketClient>,
    suggestion_field: String,
    threshold: f64,
}

impl Reconciler {
    pub fn new(
        client: Arc<dyn TicketClient>,
        suggestion_field: impl Into<String>,
        threshold: f64,
    ) -> Self {
        Self {
            client,
            suggestion_field: suggestion_field.into(),
            threshold,
        }
    }

    pub async fn reconcile(
        &self,
        ticket_id: &str,
        suggestion: &Suggestion,
        decision: &Decision,
        action: Option<&ActionResult>,
    ) -> TicketUpdate {
        let mut fields = Map::new();
        fields.insert(self.suggestion_field.clone(), Value::from(suggestion.text.as_str()));
        let (field_ok, field_resp) = self
            .client
            .set_fields_and_note(ticket_id, fields, &self.base_note(decision, action))
            .await;

        let (outcome, response, note) = if self.auto_resolvable(decision, action) {
            let note = resolution_note(decision, action);
            let (ok, resp) = self
                .client
                .update_ticket(ticket_id, TicketUpdateKind::Resolve, &note)
                .await;
            (ReconcileOutcome::for_resolve(ok), resp, note)
        } else {
            let note = self.escalation_note(suggestion, decision, action);
            let (ok, resp) = self
                .client
                .update_ticket(ticket_id, TicketUpdateKind::Escalate, &note)
                .await;
            (ReconcileOutcome::for_escalate(ok), resp, note)
        };

        info!(ticket_id, field_ok, outcome = %outcome, "ticket reconciled");

        TicketUpdate {
            ticket_id: ticket_id.to_string(),
            ticket_ai_field_update_ok: field_ok,
            ticket_ai_field_update_resp: field_resp,
            ticket_update_status: outcome,
            ticket_update_response: response,
            ticket_update_note: note,
        }
    }

    fn auto_resolvable(&self, decision: &Decision, action: Option<&ActionResult>) -> bool {
        decision.automation_allowed
            && action.is_some_and(ActionResult::is_success)
            && decision.confidence >= self.threshold
    }

    fn base_note(&self, decision: &Decision, action: Option<&ActionResult>) -> String {
        format!(
            "AI suggestion saved to '{}'.\nDecision reason: {}\n\
             Action status: {}\nAction message: {}",
            self.suggestion_field,
            decision_reason(decision),
            status_label(action),
            action
                .map(|a| a.message.as_str())
                .filter(|m| !m.is_empty())
                .unwrap_or("No action message"),
        )
    }

    /// Every unmet resolve condition, comma-joined.
    pub fn failure_reasons(&self, decision: &Decision, action: Option<&ActionResult>) -> String {
        let mut bits = Vec::new();
        if !decision.automation_allowed {
            bits.push("automation not allowed".to_string());
        }
        if !action.is_some_and(|a| a.status == ActionStatus::Success) {
            bits.push(format!("action status: {}", status_label(action)));
        }
        if decision.confidence < self.threshold {
            bits.push(format!(
                "low confidence ({:.2} < {})",
                decision.confidence, self.threshold
            ));
        }
        if bits.is_empty() {
            "Unspecified".to_string()
        } else {
            bits.join(", ")
        }
    }

    fn escalation_note(
        &self,
        suggestion: &Suggestion,
        decision: &Decision,
        action: Option<&ActionResult>,
    ) -> String {
        format!(
            "AI could not auto-resolve.\nFailure reason: {}\n\n\
             AI Failure Message (from suggestion):\n{}\n\n\
             Decision reason: {}\nLLM raw output: {}\nPayload: {}\nAction result: {}\n",
            self.failure_reasons(decision, action),
            suggestion.text,
            decision_reason(decision),
            decision.llm_raw_output.as_deref().unwrap_or(""),
            payload_summary(decision),
            action_summary(action),
        )
    }
}

fn resolution_note(decision: &Decision, action: Option<&ActionResult>) -> String {
    format!(
        "Resolved by AI automation.\nApproved action: {}\nConfidence: {:.2}\n\
         Payload: {}\nAction result: {}\n",
        decision
            .approved_action
            .map(|a| a.as_str())
            .unwrap_or("N/A"),
        decision.confidence,
        payload_summary(decision),
        action_summary(action),
    )
}

fn decision_reason(decision: &Decision) -> &str {
    if decision.reason.is_empty() {
        "No decision reason provided."
    } else {
        &decision.reason
    }
}

fn status_label(action: Option<&ActionResult>) -> String {
    action.map_or_else(|| "not run".to_string(), |a| a.status.to_string())
}

fn payload_summary(decision: &Decision) -> String {
    decision
        .payload
        .as_ref()
        .and_then(|p| serde_json::to_string(p).ok())
        .unwrap_or_else(|| "None".to_string())
}

fn action_summary(action: Option<&ActionResult>) -> String {
    action
        .and_then(|a| serde_json::to_string(a).ok())
        .unwrap_or_else(|| "None".to_string())
}
