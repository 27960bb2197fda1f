//! CLI argument parsing and subcommand dispatch.

use clap::{Parser, Subcommand};
use tracing::info;

use triage_core::{Config, IncidentQuery, DEFAULT_TOP_K};
use triage_server::{build_router, startup};

#[derive(Parser)]
#[command(name = "triage-server", version, about = "Retrieval-grounded incident triage service")]
pub struct Cli {
    /// Config profile; keys are read as `<PROFILE>_<KEY>` first.
    #[arg(long, global = true, env = "TRIAGE_PROFILE")]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server (default)
    Serve {
        /// Overrides HOST
        #[arg(long)]
        host: Option<String>,
        /// Overrides PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the records most similar to a query as JSON
    Search {
        query: String,
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },
    /// Print the automation decision for a query without acting on it
    Decide {
        query: String,
        /// Configuration item the incident concerns
        #[arg(long, default_value = "")]
        ci: String,
    },
    /// Print the resolved configuration as JSON, without secrets
    Config,
}

impl Cli {
    pub fn config(&self) -> Config {
        match self.profile.as_deref() {
            Some(profile) => Config::for_profile(profile),
            None => Config::from_env(),
        }
    }
}

pub async fn dispatch(command: Option<Command>, mut config: Config) -> anyhow::Result<()> {
    match command.unwrap_or(Command::Serve { host: None, port: None }) {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
        Command::Search { query, top_k } => {
            let request = IncidentQuery::new(query).with_top_k(top_k);
            request.validate()?;
            let retriever = startup::open_retriever(&config)?;
            let results = retriever.search(&request.query, request.top_k).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        Command::Decide { query, ci } => {
            let request = IncidentQuery::new(query).with_configuration_item(ci);
            request.validate()?;
            let engine = startup::decision_engine(&config)?;
            let decision = engine.decide(&request.query, &request.configuration_item).await;
            println!("{}", serde_json::to_string_pretty(&decision)?);
            Ok(())
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config.redacted_summary())?);
            Ok(())
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = startup::build_state(config)?;
    let app = build_router(state)?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
