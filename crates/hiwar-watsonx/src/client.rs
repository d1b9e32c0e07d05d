//! watsonx.ai client implementation
//!
//! watsonx exposes prompt-in/text-out generation rather than a chat API,
//! so the chat request is flattened into a single transcript prompt and
//! the response is read back from the SSE stream.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;

use hiwar_core::{
    ChatRequest, ChatRole, Error, GenerationConfig, GenerationResult, LanguageModel, Result,
};

use crate::config::WatsonxConfig;

/// watsonx.ai client
pub struct WatsonxClient {
    config: WatsonxConfig,
    access_token: Option<String>,
    client: Client,
    current_model: String,
}

#[derive(Serialize)]
struct TokenRequest {
    grant_type: String,
    apikey: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Serialize)]
struct GenerationParams {
    decoding_method: String,
    max_new_tokens: u32,
    min_new_tokens: u32,
    temperature: f32,
    repetition_penalty: f32,
    stop_sequences: Vec<String>,
}

#[derive(Serialize)]
struct GenerationRequest {
    input: String,
    parameters: GenerationParams,
    model_id: String,
    project_id: String,
}

#[derive(Deserialize)]
struct GenerationResults {
    generated_text: String,
}

#[derive(Deserialize)]
struct GenerationData {
    results: Vec<GenerationResults>,
}

impl WatsonxClient {
    /// Model constants
    pub const GRANITE_3_3_8B_INSTRUCT: &'static str = "ibm/granite-3-3-8b-instruct";

    /// Create a new watsonx client from configuration
    pub fn new(config: WatsonxConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            config,
            access_token: None,
            client,
            current_model: Self::GRANITE_3_3_8B_INSTRUCT.to_string(),
        })
    }

    /// Create a new watsonx client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = WatsonxConfig::from_env()?;
        Self::new(config)
    }

    /// Set the model to use for generation
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.current_model = model_id.into();
        self
    }

    /// Render the chat request as a transcript prompt ending at the
    /// assistant's cue. "User:" is also the stop sequence, so the model
    /// cannot continue the conversation on its own.
    pub(crate) fn build_prompt(request: &ChatRequest) -> String {
        let mut prompt = String::new();
        prompt.push_str(&request.system_prompt);
        prompt.push_str("\n\n");

        for turn in &request.history {
            let speaker = match turn.role {
                ChatRole::User => "User",
                ChatRole::Assistant => "Assistant",
            };
            prompt.push_str(speaker);
            prompt.push_str(": ");
            prompt.push_str(&turn.content);
            prompt.push('\n');
        }

        prompt.push_str("User: ");
        prompt.push_str(&request.user_prompt);
        prompt.push_str("\nAssistant:");
        prompt
    }

    async fn perform_generation(
        &self,
        request: &ChatRequest,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let access_token = self.access_token.as_ref().ok_or_else(|| {
            Error::Authentication("Not authenticated. Call connect() first.".to_string())
        })?;

        let params = GenerationParams {
            decoding_method: "sample".to_string(),
            max_new_tokens: config.max_tokens,
            min_new_tokens: 1,
            temperature: config.temperature,
            repetition_penalty: 1.1,
            stop_sequences: vec!["User:".to_string()],
        };

        let request_body = GenerationRequest {
            input: Self::build_prompt(request),
            parameters: params,
            model_id: config.model_id.clone(),
            project_id: self.config.project_id.clone(),
        };

        let url = format!(
            "{}/ml/v1/text/generation_stream?version=2023-05-29",
            self.config.api_url
        );

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", access_token))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Generation(format!(
                "watsonx API request failed with status {}: {}",
                status, error_text
            )));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let answer = Self::collect_sse_text(&response_text);

        if answer.trim().is_empty() {
            return Err(Error::Generation(
                "empty response from watsonx API".to_string(),
            ));
        }

        Ok(GenerationResult {
            text: Self::clean_answer(&answer),
            model_id: config.model_id.clone(),
            tokens_used: None,
        })
    }

    /// Concatenate the generated_text fragments out of an SSE body
    pub(crate) fn collect_sse_text(response_text: &str) -> String {
        let mut answer = String::new();

        for line in response_text.lines() {
            let Some(json_data) = line.strip_prefix("data: ") else {
                continue;
            };

            if json_data.trim().is_empty() || json_data.trim() == "[DONE]" {
                continue;
            }

            if let Ok(data) = serde_json::from_str::<GenerationData>(json_data) {
                for result in &data.results {
                    answer.push_str(&result.generated_text);
                }
            }
        }

        answer
    }

    /// Strip transcript artifacts the model sometimes echoes back
    pub(crate) fn clean_answer(answer: &str) -> String {
        let mut cleaned = answer.trim();

        if let Some(rest) = cleaned.strip_prefix("Assistant:") {
            cleaned = rest.trim();
        }

        let cleaned = match cleaned.find("\nUser:") {
            Some(pos) => &cleaned[..pos],
            None => cleaned,
        };

        cleaned.trim().to_string()
    }
}

#[async_trait]
impl LanguageModel for WatsonxClient {
    async fn connect(&mut self) -> Result<()> {
        let token_request = TokenRequest {
            grant_type: "urn:ibm:params:oauth:grant-type:apikey".to_string(),
            apikey: self.config.api_key.clone(),
        };

        let url = format!("https://{}/identity/token", self.config.iam_url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .form(&token_request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Authentication(format!(
                "Authentication failed: {}",
                response.status()
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        self.access_token = Some(token_response.access_token);

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
                "watsonx request exceeded {:?}",
                config.timeout
            ))),
        }
    }

    fn model_id(&self) -> &str {
        &self.current_model
    }
}
