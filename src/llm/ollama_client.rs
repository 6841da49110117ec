// External dependencies
use log::{debug, info, warn};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

// Internal dependencies
use crate::config::OllamaConfig;
use crate::llm::endpoint;
use crate::llm::error::{LlmError, LlmResult};
use crate::llm::prompt::{CodeRequest, PromptBuilder};
use crate::llm::response::ResponseParser;
use crate::llm::types::ChatMessage;

// ============================================================================
// Ollama API Structures
// ============================================================================

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[serde(default)]
    done: bool,
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ChatMessage,
    #[serde(default)]
    done: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OllamaModelsResponse {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

pub struct OllamaClient {
    client: Client,
    base_url: Url,
    model_name: String,
    chat_model: String,
    top_p: f32,
    prompts: PromptBuilder,
    parser: ResponseParser,
}

// ============================================================================
// Client Implementation
// ============================================================================

impl OllamaClient {
    /// Creates a new OllamaClient from the `[ollama]` settings
    pub fn new(config: &OllamaConfig) -> LlmResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = Url::parse(&config.base_url)?;

        Ok(Self {
            client,
            base_url,
            model_name: config.model.clone(),
            chat_model: config.chat_model.clone(),
            top_p: config.top_p,
            prompts: PromptBuilder::new(),
            parser: ResponseParser::new(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> LlmResult<Self> {
        self.base_url = Url::parse(base_url)?;
        Ok(self)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    // ========================================================================
    // Connection and Model Listing
    // ========================================================================

    /// Verifies the Ollama service answers on `/api/tags`
    pub async fn verify_connection(&self) -> LlmResult<()> {
        debug!("Verifying Ollama connection");

        let url = endpoint(&self.base_url, "api/tags")?;
        let response = self.client.get(url).send().await?;
        check_status(response).await?;

        info!("Ollama connection verified");
        Ok(())
    }

    /// Lists all locally available models
    pub async fn list_models(&self) -> LlmResult<Vec<String>> {
        debug!("Listing available models");

        let url = endpoint(&self.base_url, "api/tags")?;
        let response = self.client.get(url).send().await?;
        let body = check_status(response).await?.text().await?;

        let models_response: OllamaModelsResponse = serde_json::from_str(&body)?;
        let model_names: Vec<String> = models_response.models.into_iter().map(|m| m.name).collect();

        debug!("Found {} models", model_names.len());
        Ok(model_names)
    }

    // ========================================================================
    // Generation
    // ========================================================================

    /// Single non-streamed completion on `/api/generate`
    pub async fn generate(&self, prompt: &str, temperature: f32) -> LlmResult<String> {
        let url = endpoint(&self.base_url, "api/generate")?;

        let mut options = HashMap::new();
        options.insert("temperature".to_string(), serde_json::Value::from(temperature));
        options.insert("top_p".to_string(), serde_json::Value::from(self.top_p));

        let request = OllamaGenerateRequest {
            model: &self.model_name,
            prompt,
            stream: false,
            options,
        };

        debug!("Sending request to Ollama, prompt length: {}", prompt.len());

        let response = self.client.post(url).json(&request).send().await?;
        let body = check_status(response).await?.text().await?;
        let generate_response: OllamaGenerateResponse = serde_json::from_str(&body)?;

        if !generate_response.done {
            warn!("Generation was not completed");
        }

        debug!(
            "Generated response length: {}",
            generate_response.response.len()
        );
        Ok(generate_response.response)
    }

    /// Generates code for a task and returns only the code
    pub async fn generate_code(&self, request: &CodeRequest) -> LlmResult<String> {
        info!(
            "Generating {} code ({}) with {}",
            request.task.kind(),
            request.language,
            self.model_name
        );

        let prompt = self.prompts.build_codegen_prompt(request);
        let response = self.generate(&prompt, request.task.temperature()).await?;
        let code = self.parser.extract_code_block(&response);

        if code.is_empty() {
            return Err(LlmError::EmptyResult);
        }
        Ok(code)
    }

    /// Sends the whole message history on `/api/chat` and returns the reply
    pub async fn chat(&self, messages: &[ChatMessage]) -> LlmResult<String> {
        let url = endpoint(&self.base_url, "api/chat")?;

        let request = OllamaChatRequest {
            model: &self.chat_model,
            messages,
            stream: false,
        };

        debug!("Sending {} messages to {}", messages.len(), self.chat_model);

        let response = self.client.post(url).json(&request).send().await?;
        let body = check_status(response).await?.text().await?;
        let chat_response: OllamaChatResponse = serde_json::from_str(&body)?;

        if !chat_response.done {
            warn!("Chat reply was not completed");
        }
        Ok(chat_response.message.content)
    }
}

async fn check_status(response: Response) -> LlmResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(LlmError::Upstream {
        status: status.as_u16(),
        body,
    })
}
