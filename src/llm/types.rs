use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Model Selection
// ============================================================================

/// DeepSeek chat models. Also selectable by index (`0`, `1`) on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChatModel {
    DeepseekChat,
    #[default]
    DeepseekReasoner,
}

impl ChatModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatModel::DeepseekChat => "deepseek-chat",
            ChatModel::DeepseekReasoner => "deepseek-reasoner",
        }
    }
}

impl fmt::Display for ChatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" | "deepseek-chat" | "chat" => Ok(ChatModel::DeepseekChat),
            "1" | "deepseek-reasoner" | "reasoner" => Ok(ChatModel::DeepseekReasoner),
            other => Err(format!(
                "unknown model '{other}' (expected 0 | deepseek-chat | 1 | deepseek-reasoner)"
            )),
        }
    }
}

// ============================================================================
// Request Structures
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
}

/// Named numeric sampling options, flattened into the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SamplingOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(flatten)]
    pub sampling: SamplingOptions,
}

impl ChatRequest {
    /// A single-turn user request.
    pub fn single_turn(
        model: ChatModel,
        prompt: &str,
        stream: bool,
        sampling: SamplingOptions,
    ) -> Self {
        Self {
            model: model.as_str().to_string(),
            messages: vec![ChatMessage::user(prompt)],
            stream,
            sampling,
        }
    }
}

// ============================================================================
// Response Structures
// ============================================================================

/// One decoded `data:` payload of a streamed completion.
#[derive(Debug, Default, Deserialize)]
pub struct StreamChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub content: Option<String>,
}

impl StreamChunk {
    /// Text contributed by the first choice, if any.
    pub fn first_delta(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_parses_index_and_name() {
        assert_eq!("0".parse::<ChatModel>().unwrap(), ChatModel::DeepseekChat);
        assert_eq!("1".parse::<ChatModel>().unwrap(), ChatModel::DeepseekReasoner);
        assert_eq!(
            "deepseek-chat".parse::<ChatModel>().unwrap(),
            ChatModel::DeepseekChat
        );
        assert!("2".parse::<ChatModel>().is_err());
    }

    #[test]
    fn request_flattens_sampling_and_omits_unset() {
        let sampling = SamplingOptions {
            max_tokens: Some(512),
            temperature: Some(0.5),
            ..Default::default()
        };
        let request = ChatRequest::single_turn(ChatModel::DeepseekChat, "hi", true, sampling);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "deepseek-chat");
        assert_eq!(value["stream"], true);
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "hi");
        assert_eq!(value["max_tokens"], 512);
        assert_eq!(value["temperature"], 0.5);
        assert!(value.get("top_p").is_none());
        assert!(value.get("sampling").is_none());
    }

    #[test]
    fn chunk_ignores_unknown_fields() {
        let chunk: StreamChunk = serde_json::from_str(
            r#"{"id":"x","object":"chat.completion.chunk","choices":[{"index":0,"delta":{"role":"assistant","content":"Hi"},"finish_reason":null}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.first_delta(), Some("Hi"));
    }

    #[test]
    fn chunk_with_null_content_has_no_delta() {
        let chunk: StreamChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"content":null}}]}"#).unwrap();
        assert_eq!(chunk.first_delta(), None);

        let empty: StreamChunk = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.first_delta(), None);
    }
}
