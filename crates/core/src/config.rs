use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

/// Parse a profiled env var, keeping `default` when unset or malformed.
fn profiled_env_parse<T: FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn strip_trailing_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub ollama: OllamaConfig,
    pub embedding: EmbeddingConfig,
    pub index: IndexConfig,
    pub policy: PolicyConfig,
    pub ticketing: TicketingConfig,
    pub actions: ActionsConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `TRIAGE_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("TRIAGE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            llm: LlmConfig::from_env_profiled(p),
            ollama: OllamaConfig::from_env_profiled(p),
            embedding: EmbeddingConfig::from_env_profiled(p),
            index: IndexConfig::from_env_profiled(p),
            policy: PolicyConfig::from_env_profiled(p),
            ticketing: TicketingConfig::from_env_profiled(p),
            actions: ActionsConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() {
            "default"
        } else {
            &self.profile
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:      {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  llm:         provider={}, configured={}",
            self.llm.provider,
            self.llm.is_configured()
        );
        tracing::info!(
            "  embedding:   provider={}, dimensions={}",
            self.embedding.provider,
            self.embedding.dimensions
        );
        tracing::info!("  index:       dir={}", self.index.dir.display());
        tracing::info!(
            "  policy:      confidence_threshold={:.2}",
            self.policy.confidence_threshold
        );
        tracing::info!(
            "  ticketing:   instance={}, configured={}",
            self.ticketing.instance.as_deref().unwrap_or("(none)"),
            self.ticketing.is_configured()
        );
        tracing::info!(
            "  actions:     order={}, customer={}, asset={}, invoice={}",
            self.actions.order_service_url,
            self.actions.customer_service_url,
            self.actions.asset_service_url,
            self.actions.invoice_base_url.as_deref().unwrap_or("(none)")
        );
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "server": { "host": self.server.host, "port": self.server.port },
            "llm": {
                "provider": self.llm.provider,
                "temperature": self.llm.temperature,
                "max_tokens": self.llm.max_tokens,
                "configured": self.llm.is_configured(),
            },
            "embedding": {
                "provider": self.embedding.provider,
                "dimensions": self.embedding.dimensions,
            },
            "index": { "dir": self.index.dir },
            "policy": { "confidence_threshold": self.policy.confidence_threshold },
            "ticketing": {
                "instance": self.ticketing.instance,
                "suggestion_field": self.ticketing.suggestion_field,
                "configured": self.ticketing.is_configured(),
            },
            "actions": {
                "order_service_url": self.actions.order_service_url,
                "customer_service_url": self.actions.customer_service_url,
                "asset_service_url": self.actions.asset_service_url,
                "invoice_configured": self.actions.invoice_configured(),
            },
        })
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_parse(p, "PORT", 5000),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
        }
    }
}

// ── LLM (Groq / OpenAI / Anthropic / Gemini / Ollama) ─────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "groq", "openai", "anthropic", "gemini", "ollama"
    pub provider: String,
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub groq_base_url: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            provider: profiled_env_or(p, "LLM_PROVIDER", "groq").to_lowercase(),
            groq_api_key: profiled_env_opt(p, "GROQ_API_KEY"),
            groq_model: profiled_env_or(p, "GROQ_MODEL", "llama-3.1-8b-instant"),
            groq_base_url: strip_trailing_slash(profiled_env_or(
                p,
                "GROQ_BASE_URL",
                "https://api.groq.com/openai",
            )),
            openai_api_key: profiled_env_opt(p, "OPENAI_API_KEY"),
            openai_model: profiled_env_or(p, "OPENAI_MODEL", "gpt-4o-mini"),
            openai_base_url: profiled_env_opt(p, "OPENAI_BASE_URL").map(strip_trailing_slash),
            anthropic_api_key: profiled_env_opt(p, "ANTHROPIC_API_KEY"),
            anthropic_model: profiled_env_or(p, "ANTHROPIC_MODEL", "claude-sonnet-4-5-20250929"),
            gemini_api_key: profiled_env_opt(p, "GEMINI_API_KEY"),
            gemini_model: profiled_env_or(p, "GEMINI_MODEL", "gemini-2.0-flash-lite"),
            temperature: profiled_env_parse(p, "LLM_TEMPERATURE", 0.0),
            max_tokens: profiled_env_parse(p, "LLM_MAX_TOKENS", 1024),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "groq" => self.groq_api_key.is_some(),
            "openai" => self.openai_api_key.is_some(),
            "anthropic" | "claude" => self.anthropic_api_key.is_some(),
            "gemini" => self.gemini_api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }
}

// ── Ollama (local models) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
    pub embedding_model: String,
}

impl OllamaConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: strip_trailing_slash(profiled_env_or(p, "OLLAMA_URL", "http://localhost:11434")),
            model: profiled_env_or(p, "OLLAMA_MODEL", "llama3.2"),
            embedding_model: profiled_env_or(p, "OLLAMA_EMBEDDING_MODEL", "all-minilm"),
        }
    }
}

// ── Embedding ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "ollama", "openai"
    pub provider: String,
    pub dimensions: u32,
    /// Model name for the OpenAI-compatible embedder.
    pub model: String,
}

impl EmbeddingConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            provider: profiled_env_or(p, "EMBEDDING_PROVIDER", "ollama").to_lowercase(),
            dimensions: profiled_env_parse(p, "EMBEDDING_DIMENSIONS", 384),
            model: profiled_env_or(p, "EMBEDDING_MODEL", "text-embedding-3-small"),
        }
    }
}

// ── Vector index ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory holding `vectors.f32` and `meta.json`.
    pub dir: PathBuf,
}

impl IndexConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            dir: PathBuf::from(profiled_env_or(p, "INDEX_DIR", "data/index")),
        }
    }
}

// ── Automation policy ─────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub confidence_threshold: f64,
}

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.90;

impl PolicyConfig {
    fn from_env_profiled(p: &str) -> Self {
        let threshold = profiled_env_opt(p, "AI_CONFIDENCE_THRESHOLD")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|t| (0.0..=1.0).contains(t))
            .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD);
        Self {
            confidence_threshold: threshold,
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

// ── Ticketing (ServiceNow Table API) ──────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketingConfig {
    /// Instance base URL without trailing slash, e.g. `https://dev123.service-now.com`.
    pub instance: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Custom incident field that receives the AI suggestion text.
    pub suggestion_field: String,
    pub timeout_secs: u64,
}

impl TicketingConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            instance: profiled_env_opt(p, "SERVICENOW_INSTANCE")
                .map(strip_trailing_slash)
                .filter(|s| !s.is_empty()),
            username: profiled_env_opt(p, "SERVICENOW_USERNAME"),
            password: profiled_env_opt(p, "SERVICENOW_PASSWORD"),
            suggestion_field: profiled_env_or(p, "AI_SUGGESTION_FIELD", "u_ai_suggestion"),
            timeout_secs: profiled_env_parse(p, "SERVICENOW_TIMEOUT_SECS", 15),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.instance.is_some() && self.username.is_some() && self.password.is_some()
    }
}

// ── Remote fix actions ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionsConfig {
    pub order_service_url: String,
    pub customer_service_url: String,
    pub asset_service_url: String,
    pub invoice_base_url: Option<String>,
    pub invoice_api_key: Option<String>,
    pub timeout_secs: u64,
}

impl ActionsConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            order_service_url: strip_trailing_slash(profiled_env_or(
                p,
                "ORDER_SERVICE_URL",
                "http://localhost:7001",
            )),
            customer_service_url: strip_trailing_slash(profiled_env_or(
                p,
                "CUSTOMER_SERVICE_URL",
                "http://localhost:7002",
            )),
            asset_service_url: strip_trailing_slash(profiled_env_or(
                p,
                "ASSET_SERVICE_URL",
                "http://localhost:7003",
            )),
            invoice_base_url: profiled_env_opt(p, "NINJA_URL").map(strip_trailing_slash),
            invoice_api_key: profiled_env_opt(p, "NINJAINVOICE_API_KEY"),
            timeout_secs: profiled_env_parse(p, "ACTION_TIMEOUT_SECS", 30),
        }
    }

    pub fn invoice_configured(&self) -> bool {
        self.invoice_base_url.is_some() && self.invoice_api_key.is_some()
    }
}
