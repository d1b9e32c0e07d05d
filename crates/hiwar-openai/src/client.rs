//! OpenAI chat-completions client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;

use hiwar_core::{
    ChatRequest, ChatRole, Error, GenerationConfig, GenerationResult, LanguageModel, Result,
};

use crate::config::OpenAiConfig;

/// OpenAI chat-completions client
pub struct OpenAiClient {
    config: OpenAiConfig,
    client: Client,
    current_model: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionUsage {
    total_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
    usage: Option<CompletionUsage>,
}

impl OpenAiClient {
    /// Model constants
    pub const GPT_4O_MINI: &'static str = "gpt-4o-mini-2024-07-18";

    /// Create a new OpenAI client from configuration
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            config,
            client,
            current_model: Self::GPT_4O_MINI.to_string(),
        })
    }

    /// Create a new OpenAI client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = OpenAiConfig::from_env()?;
        Self::new(config)
    }

    /// Set the model to use for generation
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.current_model = model_id.into();
        self
    }

    /// Flatten a chat request into the provider's message list:
    /// system persona, prior turns oldest first, then the templated
    /// user prompt carrying context and query.
    pub(crate) fn build_messages(request: &ChatRequest) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(request.history.len() + 2);

        messages.push(ChatMessage {
            role: "system".to_string(),
            content: request.system_prompt.clone(),
        });

        for turn in &request.history {
            let role = match turn.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
            };
            messages.push(ChatMessage {
                role: role.to_string(),
                content: turn.content.clone(),
            });
        }

        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.user_prompt.clone(),
        });

        messages
    }

    async fn perform_generation(
        &self,
        request: &ChatRequest,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let body = CompletionRequest {
            model: config.model_id.clone(),
            messages: Self::build_messages(request),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        };

        let url = format!("{}/chat/completions", self.config.api_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if status.as_u16() == 429 {
                return Err(Error::Generation(format!("rate limited: {}", error_text)));
            }
            if status.as_u16() == 401 {
                return Err(Error::Authentication(format!(
                    "OpenAI rejected the API key: {}",
                    error_text
                )));
            }
            return Err(Error::Generation(format!(
                "OpenAI API request failed with status {}: {}",
                status, error_text
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        let text = completion
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .unwrap_or("")
            .to_string();

        if text.is_empty() {
            return Err(Error::Generation(
                "empty response from OpenAI API".to_string(),
            ));
        }

        Ok(GenerationResult {
            text,
            model_id: config.model_id.clone(),
            tokens_used: completion.usage.map(|u| u.total_tokens),
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn connect(&mut self) -> Result<()> {
        // Bearer-token auth, no handshake. Catch an obviously bad
        // credential here instead of on the first question.
        if self.config.api_key.trim().is_empty() {
            return Err(Error::Authentication("OPENAI_API_KEY is empty".to_string()));
        }
        Ok(())
    }

    async fn generate(&self, request: &ChatRequest) -> Result<GenerationResult> {
        let config = GenerationConfig {
            model_id: self.current_model.clone(),
            ..Default::default()
        };
        self.generate_with_config(request, &config).await
    }

    async fn generate_with_config(
        &self,
        request: &ChatRequest,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let generation_future = self.perform_generation(request, config);

        match timeout(config.timeout, generation_future).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "OpenAI request exceeded {:?}",
                config.timeout
            ))),
        }
    }

    fn model_id(&self) -> &str {
        &self.current_model
    }
}
