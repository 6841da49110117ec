pub mod conversation;
pub mod deepseek_client;
pub mod error;
pub mod ollama_client;
pub mod prompt;
pub mod response;
pub mod stream;
pub mod types;

pub use conversation::Conversation;
pub use deepseek_client::DeepSeekClient;
pub use error::{LlmError, LlmResult, TransportError};
pub use ollama_client::OllamaClient;
pub use prompt::{CodeRequest, CodeTask, PromptBuilder};
pub use response::ResponseParser;
pub use stream::StreamAggregator;
pub use types::{ChatMessage, ChatModel, SamplingOptions};

use url::Url;

/// Joins `path` under `base`, keeping any path prefix the base already has
/// (`https://host/v1` + `chat/completions` -> `https://host/v1/chat/completions`).
pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path() {
        let base = Url::parse("https://api.deepseek.com/v1").unwrap();
        assert_eq!(
            endpoint(&base, "chat/completions").unwrap().as_str(),
            "https://api.deepseek.com/v1/chat/completions"
        );

        let root = Url::parse("http://localhost:11434").unwrap();
        assert_eq!(
            endpoint(&root, "/api/tags").unwrap().as_str(),
            "http://localhost:11434/api/tags"
        );
    }
}
