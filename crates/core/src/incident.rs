use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TriageError;

pub const DEFAULT_TOP_K: usize = 5;

/// Metadata value used when a record lacks a field.
pub const NOT_PROVIDED: &str = "Not Provided";

/// One inbound triage request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentQuery {
    pub query: String,
    pub configuration_item: String,
    pub ticket_id: Option<String>,
    pub top_k: usize,
}

impl IncidentQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            configuration_item: String::new(),
            ticket_id: None,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_configuration_item(mut self, ci: impl Into<String>) -> Self {
        self.configuration_item = ci.into();
        self
    }

    pub fn with_ticket(mut self, ticket_id: impl Into<String>) -> Self {
        self.ticket_id = Some(ticket_id.into());
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Reject requests that carry no description text.
    pub fn validate(&self) -> Result<(), TriageError> {
        if self.query.trim().is_empty() {
            return Err(TriageError::EmptyQuery);
        }
        Ok(())
    }
}

/// Where a retrieved record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Incident,
    KbArticle,
    #[serde(other)]
    Unknown,
}

impl SourceKind {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "incident" => SourceKind::Incident,
            "kb_article" | "kb" | "knowledge-article" | "knowledge_article" => {
                SourceKind::KbArticle
            }
            _ => SourceKind::Unknown,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Incident => write!(f, "incident"),
            SourceKind::KbArticle => write!(f, "kb_article"),
            SourceKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// A nearest-neighbor hit from the vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedRecord {
    pub rank: usize,
    pub id: String,
    pub similarity_score: f64,
    pub source: SourceKind,
    pub training_text: String,
    pub assignment_group: String,
    pub configuration_item: String,
    pub category: String,
}

/// Whether the suggestion text came from the model or from a failure path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    Generated,
    Degraded,
}

/// Human-readable resolution steps for the ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub status: SuggestionStatus,
    pub text: String,
}

impl Suggestion {
    pub fn generated(text: impl Into<String>) -> Self {
        Self {
            status: SuggestionStatus::Generated,
            text: text.into(),
        }
    }

    pub fn degraded(text: impl Into<String>) -> Self {
        Self {
            status: SuggestionStatus::Degraded,
            text: text.into(),
        }
    }
}
