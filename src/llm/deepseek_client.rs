use log::{debug, info, warn};
use reqwest::{Client, Response};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::DeepSeekConfig;
use crate::llm::endpoint;
use crate::llm::error::{LlmError, LlmResult, TransportError};
use crate::llm::stream;
use crate::llm::types::{ChatCompletion, ChatModel, ChatRequest, SamplingOptions};

const COMPLETIONS_PATH: &str = "chat/completions";

/// Client for the DeepSeek (OpenAI-compatible) chat completions API.
///
/// Holds its own HTTP client; nothing is shared process-wide.
pub struct DeepSeekClient {
    client: Client,
    base_url: Url,
    api_key: String,
    api_key_env: String,
    sampling: SamplingOptions,
}

// ============================================================================
// Client Implementation
// ============================================================================

impl DeepSeekClient {
    pub fn new(config: &DeepSeekConfig, api_key: impl Into<String>) -> LlmResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let base_url = Url::parse(&config.base_url)?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
            api_key_env: config.api_key_env.clone(),
            sampling: config.sampling(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> LlmResult<Self> {
        self.base_url = Url::parse(base_url)?;
        Ok(self)
    }

    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    // ========================================================================
    // Completions
    // ========================================================================

    /// Issues one streamed completion and returns the concatenated deltas.
    pub async fn chat_stream(
        &self,
        prompt: &str,
        model: ChatModel,
        cancel: &CancellationToken,
    ) -> LlmResult<String> {
        self.require_credential()?;

        let request = ChatRequest::single_turn(model, prompt, true, self.sampling.clone());
        debug!(
            "Streaming completion from {model}, prompt length: {}",
            prompt.len()
        );

        let text = with_cancel(cancel, async {
            let response = self.post(&request).await?;
            stream::aggregate(response.bytes_stream())
                .await
                .map_err(LlmError::from)
        })
        .await?;

        info!("Received {} characters from {model}", text.len());
        Ok(text)
    }

    /// Issues one non-streamed completion and returns the first choice's content.
    pub async fn chat(
        &self,
        prompt: &str,
        model: ChatModel,
        cancel: &CancellationToken,
    ) -> LlmResult<String> {
        self.require_credential()?;

        let request = ChatRequest::single_turn(model, prompt, false, self.sampling.clone());
        debug!("Requesting completion from {model}, prompt length: {}", prompt.len());

        let body = with_cancel(cancel, async {
            let response = self.post(&request).await?;
            response.text().await.map_err(LlmError::from)
        })
        .await?;

        let completion: ChatCompletion = serde_json::from_str(&body)?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResult)?;

        info!("Received {} characters from {model}", content.len());
        Ok(content)
    }

    fn require_credential(&self) -> LlmResult<()> {
        if self.has_credential() {
            Ok(())
        } else {
            Err(LlmError::MissingCredential(self.api_key_env.clone()))
        }
    }

    async fn post(&self, request: &ChatRequest) -> LlmResult<Response> {
        let url = endpoint(&self.base_url, COMPLETIONS_PATH)?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            warn!("DeepSeek returned {status}");
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

/// Races `work` against the token; cancellation drops the in-flight request.
async fn with_cancel<T, F>(cancel: &CancellationToken, work: F) -> LlmResult<T>
where
    F: Future<Output = LlmResult<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            info!("Request cancelled");
            Err(TransportError::Cancelled.into())
        }
        result = work => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(key: &str) -> DeepSeekClient {
        DeepSeekClient::new(&DeepSeekConfig::default(), key).unwrap()
    }

    #[tokio::test]
    async fn empty_key_fails_before_any_request() {
        // Unroutable base URL: reaching the network would surface as Transport.
        let client = client("  ")
            .with_base_url("http://127.0.0.1:9")
            .unwrap();
        let cancel = CancellationToken::new();

        let err = client
            .chat_stream("hello", ChatModel::DeepseekChat, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MissingCredential(ref var) if var == "DEEPSEEK_API_KEY"));

        let err = client
            .chat("hello", ChatModel::DeepseekChat, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MissingCredential(_)));
    }

    #[tokio::test]
    async fn pre_cancelled_token_fails_with_cancelled() {
        let client = client("key").with_base_url("http://127.0.0.1:9").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client
            .chat_stream("hello", ChatModel::DeepseekChat, &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = client("key").with_base_url("not a url").err().unwrap();
        assert!(matches!(err, LlmError::InvalidUrl(_)));
    }
}
