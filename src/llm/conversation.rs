use log::debug;

use crate::llm::error::LlmResult;
use crate::llm::ollama_client::OllamaClient;
use crate::llm::types::ChatMessage;

/// Ordered chat history kept for the lifetime of the process only.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(prompt)],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of completed user/assistant exchanges.
    pub fn turns(&self) -> usize {
        self.messages.iter().filter(|m| m.role == "assistant").count()
    }

    /// Drops everything except a leading system message.
    pub fn reset(&mut self) {
        self.messages.retain(|m| m.role == "system");
    }

    /// Sends `input` with the full history. The user message is rolled back
    /// if the call fails, so history only ever holds completed exchanges.
    pub async fn ask(&mut self, client: &OllamaClient, input: &str) -> LlmResult<String> {
        self.messages.push(ChatMessage::user(input));

        match client.chat(&self.messages).await {
            Ok(reply) => {
                self.messages.push(ChatMessage::assistant(reply.clone()));
                debug!("Conversation now holds {} messages", self.messages.len());
                Ok(reply)
            }
            Err(e) => {
                self.messages.pop();
                Err(e)
            }
        }
    }
}
