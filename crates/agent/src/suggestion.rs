use std::sync::Arc;

use tracing::warn;
use triage_core::{RetrievedRecord, Suggestion};
use triage_llm::{LlmClient, PromptLibrary};
use triage_retrieval::{assignment_context, group_from_top_incident, suggestion_context};

/// Group used when nothing better is known.
pub const FALLBACK_GROUP: &str = "Service Desk";

/// Resolution text and routing for a ticket, drafted from retrieved context.
#[derive(Clone)]
pub struct SuggestionGenerator {
    llm: LlmClient,
    prompts: Arc<PromptLibrary>,
}

impl SuggestionGenerator {
    pub fn new(llm: LlmClient, prompts: Arc<PromptLibrary>) -> Self {
        Self { llm, prompts }
    }

    /// Never fails: a model error yields a degraded suggestion holding the
    /// error text.
    pub async fn suggest(
        &self,
        query: &str,
        configuration_item: &str,
        similar: &[RetrievedRecord],
    ) -> Suggestion {
        let result = match self
            .prompts
            .suggestion(query, configuration_item, &suggestion_context(similar))
        {
            Ok(prompt) => self.llm.complete_prompt(&prompt).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(text) => Suggestion::generated(text.trim()),
            Err(e) => {
                warn!(error = %e, "suggestion generation failed");
                Suggestion::degraded(format!("LLM error: {e}"))
            }
        }
    }

    pub async fn assignment_group(&self, query: &str, similar: &[RetrievedRecord]) -> String {
        if let Some(group) = group_from_top_incident(similar) {
            return group.to_string();
        }

        let result = match self.prompts.assignment_group(query, &assignment_context(similar)) {
            Ok(prompt) => self.llm.complete_prompt(&prompt).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(text) => text
                .lines()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .map(String::from)
                .unwrap_or_else(|| FALLBACK_GROUP.to_string()),
            Err(e) => {
                warn!(error = %e, "assignment group prediction failed");
                FALLBACK_GROUP.to_string()
            }
        }
    }
}
