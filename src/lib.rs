pub mod cli;
pub mod config;
pub mod llm;
pub mod workflow;

pub use cli::{Cli, CommandHandler, Commands};
pub use config::Settings;
pub use llm::{DeepSeekClient, LlmError, OllamaClient, StreamAggregator};
