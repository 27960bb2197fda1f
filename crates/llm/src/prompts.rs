//! Minijinja prompt templates for the triage pipeline.
//!
//! Templates ship inside the binary (`prompts/*.j2`), so a missing file can
//! never surface at request time. Rendering errors still come back as
//! [`LlmError::Template`].

use minijinja::{context, Environment};

use crate::provider::LlmError;

const SUGGESTION: &str = include_str!("../prompts/suggestion.j2");
const ASSIGNMENT_GROUP: &str = include_str!("../prompts/assignment_group.j2");
const DECISION: &str = include_str!("../prompts/decision.j2");
const INVOICE_PAYLOAD: &str = include_str!("../prompts/invoice_payload.j2");

pub struct PromptLibrary {
    env: Environment<'static>,
}

impl PromptLibrary {
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
        }
    }

    /// Resolution-steps prompt; `context` is the formatted retrieval block.
    pub fn suggestion(
        &self,
        query: &str,
        configuration_item: &str,
        context: &str,
    ) -> Result<String, LlmError> {
        self.render(
            SUGGESTION,
            context! { query, configuration_item, context },
        )
    }

    pub fn assignment_group(&self, query: &str, context: &str) -> Result<String, LlmError> {
        self.render(ASSIGNMENT_GROUP, context! { query, context })
    }

    /// Strict-JSON decision prompt listing the permitted action names.
    pub fn decision(
        &self,
        query: &str,
        configuration_item: &str,
        actions: &[&str],
    ) -> Result<String, LlmError> {
        self.render(DECISION, context! { query, configuration_item, actions })
    }

    pub fn invoice_payload(
        &self,
        query: &str,
        configuration_item: &str,
    ) -> Result<String, LlmError> {
        self.render(INVOICE_PAYLOAD, context! { query, configuration_item })
    }

    fn render(&self, source: &str, ctx: minijinja::Value) -> Result<String, LlmError> {
        self.env
            .render_str(source, ctx)
            .map_err(|e| LlmError::Template(e.to_string()))
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}
