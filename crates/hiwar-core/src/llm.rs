//! Language model trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::chat::ChatRequest;
use crate::error::Result;

/// Configuration for one generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub model_id: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_id: String::new(),
            max_tokens: 500,
            temperature: 0.5,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Result of a text generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub model_id: String,
    pub tokens_used: Option<u32>,
}

/// Trait for hosted language model backends (OpenAI, watsonx, ...)
///
/// This trait defines the interface the conversation core uses to talk to
/// a Large Language Model. Backends encapsulate transport, authentication,
/// and vendor-specific request formatting.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Connect/authenticate with the backend
    async fn connect(&mut self) -> Result<()>;

    /// Generate a response with default configuration
    async fn generate(&self, request: &ChatRequest) -> Result<GenerationResult>;

    /// Generate a response with custom configuration
    async fn generate_with_config(
        &self,
        request: &ChatRequest,
        config: &GenerationConfig,
    ) -> Result<GenerationResult>;

    /// Get the model ID being used
    fn model_id(&self) -> &str;
}

#[async_trait]
impl<T: LanguageModel + ?Sized> LanguageModel for Box<T> {
    async fn connect(&mut self) -> Result<()> {
        (**self).connect().await
    }

    async fn generate(&self, request: &ChatRequest) -> Result<GenerationResult> {
        (**self).generate(request).await
    }

    async fn generate_with_config(
        &self,
        request: &ChatRequest,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        (**self).generate_with_config(request, config).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}
