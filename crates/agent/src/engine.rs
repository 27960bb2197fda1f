use std::sync::Arc;

use tracing::{info, warn};
use triage_core::{truncate_chars, ActionKind, Decision, AUTO_APPROVED_ACTIONS};
use triage_llm::{LlmClient, PromptLibrary};

use crate::classify::classify_issue_type;
use crate::extract::{extract_decision, parse_invoice_payload, DecisionOutcome};
use crate::policy::PolicyGate;

/// Characters of raw model output kept on the decision.
pub const RAW_OUTPUT_CHARS: usize = 500;

/// Turns a query into a gated [`Decision`]: classify, apply the network
/// exclusion, ask the model, then run the policy (and invoice payload
/// extraction when needed).
#[derive(Clone)]
pub struct DecisionEngine {
    llm: LlmClient,
    prompts: Arc<PromptLibrary>,
    gate: PolicyGate,
}

impl DecisionEngine {
    pub fn new(llm: LlmClient, prompts: Arc<PromptLibrary>, gate: PolicyGate) -> Self {
        Self { llm, prompts, gate }
    }

    pub async fn decide(&self, query: &str, configuration_item: &str) -> Decision {
        let category = classify_issue_type(query);
        if let Some(reason) = self.gate.network_exclusion(category, configuration_item) {
            info!(%category, configuration_item, "automation excluded for network issue");
            return Decision::denied(category, reason);
        }

        let actions: Vec<&str> = AUTO_APPROVED_ACTIONS.iter().map(ActionKind::as_str).collect();
        let raw = match self
            .prompt_and_complete(|p| p.decision(query, configuration_item, &actions))
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "decision call failed");
                return Decision::denied(category, format!("LLM call failed: {e}"));
            }
        };
        let raw_output = truncate_chars(&raw, RAW_OUTPUT_CHARS).to_string();

        let model = match extract_decision(&raw) {
            DecisionOutcome::Parsed(model) => model,
            DecisionOutcome::ParseFailure { reason, raw_excerpt } => {
                warn!(%reason, "model decision unparseable");
                let mut decision = Decision::denied(
                    category,
                    format!(
                        "Invalid JSON returned by LLM. Error: {reason}. Output was: {raw_excerpt}"
                    ),
                );
                decision.llm_raw_output = Some(raw_output);
                return decision;
            }
        };

        let mut decision = self.gate.evaluate(category, &model);
        decision.llm_raw_output = Some(raw_output);

        if self.gate.needs_payload(&decision) {
            let payload = match self
                .prompt_and_complete(|p| p.invoice_payload(query, configuration_item))
                .await
            {
                Ok(raw) => parse_invoice_payload(&raw),
                Err(e) => Err(format!("payload extraction failed: {e}")),
            };
            self.gate.apply_payload(&mut decision, payload);
        }

        info!(
            action = %decision.action,
            confidence = decision.confidence,
            allowed = decision.automation_allowed,
            %category,
            "decision made"
        );
        decision
    }

    async fn prompt_and_complete<F>(&self, render: F) -> Result<String, triage_llm::LlmError>
    where
        F: FnOnce(&PromptLibrary) -> Result<String, triage_llm::LlmError>,
    {
        let prompt = render(&self.prompts)?;
        self.llm.complete_prompt(&prompt).await
    }
}
