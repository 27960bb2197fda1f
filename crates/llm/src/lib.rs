pub mod client;
pub mod extract;
pub mod prompts;
pub mod provider;
pub mod providers;

pub use client::LlmClient;
pub use extract::{extract_json_object, strip_code_fences};
pub use prompts::PromptLibrary;
pub use provider::{LlmError, LlmProvider, Message, Role};
