use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Query required")]
    EmptyQuery,

    #[error("Unknown action: {0}")]
    UnknownAction(String),
}
