//! Safety rules deciding whether a model-proposed action may run unattended.

use triage_core::{Decision, IntendedAction, InvoicePayload, IssueCategory};

use crate::extract::ModelDecision;

/// Configuration items a network issue must never automate against.
pub const NETWORK_EXCLUDED_CIS: &[&str] = &["sie-crm", "rod-brm", "rod-osm", "crm", "brm", "osm"];

pub const NETWORK_EXCLUSION_REASON: &str = "Network issues cannot trigger CRM/BRM/OSM automation.";

#[derive(Debug, Clone, Copy)]
pub struct PolicyGate {
    threshold: f64,
}

impl PolicyGate {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Checked before the model is consulted.
    pub fn network_exclusion(
        &self,
        category: IssueCategory,
        configuration_item: &str,
    ) -> Option<&'static str> {
        let ci = configuration_item.trim().to_lowercase();
        (category == IssueCategory::Network && NETWORK_EXCLUDED_CIS.contains(&ci.as_str()))
            .then_some(NETWORK_EXCLUSION_REASON)
    }

    /// Apply the allow-list and confidence floor. Payload-carrying actions
    /// still need [`PolicyGate::apply_payload`] before they are final.
    pub fn evaluate(&self, category: IssueCategory, model: &ModelDecision) -> Decision {
        let mut failures = Vec::new();
        match &model.action {
            IntendedAction::None => failures.push("model proposed no action".to_string()),
            IntendedAction::Unknown(name) => {
                failures.push(format!("action '{name}' is not recognised"))
            }
            IntendedAction::Known(kind) if !kind.is_auto_approved() => {
                failures.push(format!("action '{kind}' is not auto-approved"))
            }
            IntendedAction::Known(_) => {}
        }
        if model.confidence < self.threshold {
            failures.push(format!(
                "confidence {:.2} below threshold {:.2}",
                model.confidence, self.threshold
            ));
        }

        let allowed = failures.is_empty();
        Decision {
            automation_allowed: allowed,
            approved_action: if allowed { model.action.kind() } else { None },
            action: model.action.clone(),
            confidence: model.confidence,
            reasoning: model.reasoning.clone(),
            reason: if allowed {
                "Action auto-approved.".to_string()
            } else {
                format!("Automation not allowed: {}.", failures.join("; "))
            },
            category,
            payload: None,
            llm_raw_output: None,
        }
    }

    /// Whether `decision` is waiting on an invoice payload.
    pub fn needs_payload(&self, decision: &Decision) -> bool {
        decision.automation_allowed
            && decision
                .approved_action
                .is_some_and(|k| k.requires_payload())
    }

    /// Attach a validated payload, or revoke automation and drop it.
    pub fn apply_payload(&self, decision: &mut Decision, payload: Result<InvoicePayload, String>) {
        match payload {
            Ok(payload) => {
                decision.payload = Some(payload);
                decision.reason = "Action auto-approved and payload validated.".to_string();
            }
            Err(why) => {
                decision.automation_allowed = false;
                decision.approved_action = None;
                decision.payload = None;
                decision.reason =
                    format!("Automation not allowed: invoice payload rejected ({why}).");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::{ActionKind, LineItem};

    fn model(action: &str, confidence: f64) -> ModelDecision {
        ModelDecision {
            action: IntendedAction::parse(action),
            confidence,
            reasoning: "r".into(),
        }
    }

    #[test]
    fn network_exclusion_is_case_insensitive() {
        let gate = PolicyGate::new(0.9);
        assert_eq!(
            gate.network_exclusion(IssueCategory::Network, " Sie-CRM "),
            Some(NETWORK_EXCLUSION_REASON)
        );
        assert_eq!(
            gate.network_exclusion(IssueCategory::Network, "OSM"),
            Some(NETWORK_EXCLUSION_REASON)
        );
        assert_eq!(gate.network_exclusion(IssueCategory::Network, "Exchange"), None);
        assert_eq!(gate.network_exclusion(IssueCategory::Crm, "sie-crm"), None);
    }

    #[test]
    fn allow_list_and_threshold() {
        let gate = PolicyGate::new(0.9);

        let ok = gate.evaluate(IssueCategory::OrderMgmt, &model("update_order", 0.9));
        assert!(ok.automation_allowed);
        assert_eq!(ok.approved_action, Some(ActionKind::UpdateOrder));

        let low = gate.evaluate(IssueCategory::OrderMgmt, &model("update_order", 0.89));
        assert!(!low.automation_allowed);
        assert_eq!(low.approved_action, None);
        assert!(low.reason.contains("confidence 0.89 below threshold 0.90"));

        // Mapped remotely but not allow-listed.
        let retry = gate.evaluate(IssueCategory::OrderMgmt, &model("retry_order", 0.99));
        assert!(!retry.automation_allowed);
        assert!(retry.reason.contains("'retry_order' is not auto-approved"));

        let unknown = gate.evaluate(IssueCategory::Unknown, &model("drop_tables", 1.0));
        assert!(!unknown.automation_allowed);
        assert_eq!(unknown.action.name(), "drop_tables");
    }

    #[test]
    fn every_failed_condition_is_reported() {
        let gate = PolicyGate::new(0.9);
        let d = gate.evaluate(IssueCategory::Unknown, &model("none", 0.1));
        assert_eq!(
            d.reason,
            "Automation not allowed: model proposed no action; confidence 0.10 below threshold 0.90."
        );
    }

    #[test]
    fn payload_gate() {
        let gate = PolicyGate::new(0.9);
        let mut d = gate.evaluate(IssueCategory::Billing, &model("create_invoice", 0.95));
        assert!(gate.needs_payload(&d));

        let mut revoked = d.clone();
        gate.apply_payload(&mut revoked, Err("missing client_id".into()));
        assert!(!revoked.automation_allowed);
        assert_eq!(revoked.approved_action, None);
        assert!(revoked.reason.contains("missing client_id"));

        gate.apply_payload(
            &mut d,
            Ok(InvoicePayload {
                client_id: "ACME".into(),
                line_items: vec![LineItem {
                    product_key: "license".into(),
                    notes: String::new(),
                    cost: 10.0,
                    quantity: 1.0,
                }],
            }),
        );
        assert!(d.automation_allowed);
        assert_eq!(d.reason, "Action auto-approved and payload validated.");

        let order = gate.evaluate(IssueCategory::OrderMgmt, &model("create_order", 0.95));
        assert!(!gate.needs_payload(&order));
    }
}
