pub mod classify;
pub mod engine;
pub mod extract;
pub mod pipeline;
pub mod policy;
pub mod suggestion;

pub use classify::classify_issue_type;
pub use engine::DecisionEngine;
pub use extract::{
    extract_decision, parse_decision, DecisionOutcome, DecisionParseError, ModelDecision,
};
pub use pipeline::{Pipeline, PipelineError, TriageReport};
pub use policy::PolicyGate;
pub use suggestion::SuggestionGenerator;
