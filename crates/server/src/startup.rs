//! Startup wiring: open the index, build the providers, assemble the pipeline.
//!
//! Every failure here is fatal; request handling never sees a half-built state.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use triage_agent::{DecisionEngine, Pipeline, PolicyGate};
use triage_core::Config;
use triage_llm::{LlmClient, PromptLibrary};
use triage_retrieval::{create_embedder, Embedder, Retriever, VectorIndex};

use crate::state::AppState;

/// Open the on-disk index and pair it with the configured embedder.
pub fn open_retriever(config: &Config) -> anyhow::Result<Retriever> {
    let dir = &config.index.dir;
    let index = VectorIndex::open(dir)
        .with_context(|| format!("failed to open index at {}", dir.display()))?;
    info!(rows = index.len(), dimensions = index.dimensions(), "index opened");

    let embedder = create_embedder(config).context("failed to build embedder")?;
    info!(embedder = embedder.name(), "embedder ready");

    Retriever::new(Arc::new(index), embedder).context("embedder does not match index")
}

/// Decision path only, for the read-only `decide` command.
pub fn decision_engine(config: &Config) -> anyhow::Result<DecisionEngine> {
    let llm = LlmClient::from_config(&config.llm, &config.ollama)
        .context("failed to build LLM client")?;
    Ok(DecisionEngine::new(
        llm,
        Arc::new(PromptLibrary::new()),
        PolicyGate::new(config.policy.confidence_threshold),
    ))
}

pub fn build_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let retriever = open_retriever(&config)?;
    let pipeline = Pipeline::from_config(&config, retriever).context("failed to build pipeline")?;
    Ok(Arc::new(AppState::new(pipeline, config)))
}
