use triage_agent::Pipeline;
use triage_core::Config;

/// Shared, read-only handles for every request.
pub struct AppState {
    pub pipeline: Pipeline,
    pub config: Config,
    /// Records in the opened index, reported by the health endpoint.
    pub index_rows: usize,
}

impl AppState {
    pub fn new(pipeline: Pipeline, config: Config) -> Self {
        let index_rows = pipeline.retriever().index().len();
        Self {
            pipeline,
            config,
            index_rows,
        }
    }
}
