//! OpenAI configuration

use serde::{Deserialize, Serialize};
use std::env;

use hiwar_core::{Error, Result};

/// Configuration for the OpenAI chat-completions client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub api_url: String,
}

impl OpenAiConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            Error::Configuration("OPENAI_API_KEY environment variable not found".to_string())
        })?;

        let api_url = env::var("OPENAI_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        Ok(Self { api_key, api_url })
    }

    /// Create configuration with an explicit key
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            api_url: "https://api.openai.com/v1".to_string(),
        }
    }
}
