use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use triage_actions::{ActionDispatcher, ActionError, HttpActionDispatcher};
use triage_core::{
    ActionResult, Config, Decision, IncidentQuery, RetrievedRecord, SuggestionStatus, TicketUpdate,
    TriageError,
};
use triage_llm::{LlmClient, LlmError, PromptLibrary};
use triage_retrieval::Retriever;
use triage_ticket::{Reconciler, ServiceNowClient, TicketError};

use crate::engine::DecisionEngine;
use crate::policy::PolicyGate;
use crate::suggestion::SuggestionGenerator;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("LLM setup failed: {0}")]
    Llm(#[from] LlmError),

    #[error("action client setup failed: {0}")]
    Action(#[from] ActionError),

    #[error("ticket client setup failed: {0}")]
    Ticket(#[from] TicketError),
}

/// Everything produced for one incident request.
#[derive(Debug, Clone, Serialize)]
pub struct TriageReport {
    pub query: String,
    pub configuration_item: String,
    pub similar_items: Vec<RetrievedRecord>,
    pub ai_suggestion: String,
    pub ai_suggestion_status: SuggestionStatus,
    pub assignment_group: String,
    pub decision_engine: Decision,
    pub automation_triggered: bool,
    pub action_result: Option<ActionResult>,
    /// Present only when the request named a ticket.
    #[serde(flatten)]
    pub ticket: Option<TicketUpdate>,
}

/// The full request flow: retrieve, suggest, route, decide, act, reconcile.
pub struct Pipeline {
    retriever: Retriever,
    suggestions: SuggestionGenerator,
    engine: DecisionEngine,
    dispatcher: Arc<dyn ActionDispatcher>,
    reconciler: Reconciler,
}

impl Pipeline {
    pub fn new(
        retriever: Retriever,
        suggestions: SuggestionGenerator,
        engine: DecisionEngine,
        dispatcher: Arc<dyn ActionDispatcher>,
        reconciler: Reconciler,
    ) -> Self {
        Self {
            retriever,
            suggestions,
            engine,
            dispatcher,
            reconciler,
        }
    }

    /// Wire the production clients from config around an opened retriever.
    pub fn from_config(config: &Config, retriever: Retriever) -> Result<Self, PipelineError> {
        let llm = LlmClient::from_config(&config.llm, &config.ollama)?;
        let prompts = Arc::new(PromptLibrary::new());
        let threshold = config.policy.confidence_threshold;

        let dispatcher = Arc::new(HttpActionDispatcher::new(&config.actions)?);
        let tickets = Arc::new(ServiceNowClient::new(&config.ticketing)?);

        Ok(Self::new(
            retriever,
            SuggestionGenerator::new(llm.clone(), prompts.clone()),
            DecisionEngine::new(llm, prompts, PolicyGate::new(threshold)),
            dispatcher,
            Reconciler::new(tickets, config.ticketing.suggestion_field.clone(), threshold),
        ))
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub async fn run(&self, request: &IncidentQuery) -> Result<TriageReport, TriageError> {
        request.validate()?;
        let query = request.query.as_str();
        let ci = request.configuration_item.as_str();

        let similar_items = match self.retriever.search(query, request.top_k).await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "retrieval failed, continuing without context");
                Vec::new()
            }
        };

        let suggestion = self.suggestions.suggest(query, ci, &similar_items).await;
        let assignment_group = self.suggestions.assignment_group(query, &similar_items).await;
        let decision = self.engine.decide(query, ci).await;

        let action_result = match decision.approved_action {
            Some(kind) if decision.automation_allowed => {
                Some(self.dispatcher.dispatch(kind, query, decision.payload.as_ref()).await)
            }
            _ => None,
        };

        let ticket = match request.ticket_id.as_deref() {
            Some(ticket_id) => Some(
                self.reconciler
                    .reconcile(ticket_id, &suggestion, &decision, action_result.as_ref())
                    .await,
            ),
            None => None,
        };

        let action_status = action_result
            .as_ref()
            .map_or("-".to_string(), |r| r.status.to_string());
        let ticket_status = ticket
            .as_ref()
            .map_or("-".to_string(), |t| t.ticket_update_status.to_string());
        info!(
            similar = similar_items.len(),
            suggestion = ?suggestion.status,
            automation = decision.automation_allowed,
            %action_status,
            %ticket_status,
            "incident processed"
        );

        Ok(TriageReport {
            query: request.query.clone(),
            configuration_item: request.configuration_item.clone(),
            similar_items,
            ai_suggestion: suggestion.text,
            ai_suggestion_status: suggestion.status,
            assignment_group,
            automation_triggered: decision.automation_allowed,
            decision_engine: decision,
            action_result,
            ticket,
        })
    }
}
