//! OpenAI integration for HiwarBot
//!
//! This crate provides the OpenAI implementation of the LanguageModel trait.

mod client;
mod config;


pub use client::OpenAiClient;
pub use config::OpenAiConfig;

// Re-export core types for convenience
pub use hiwar_core::{
    ChatRequest, Error, GenerationConfig, GenerationResult, LanguageModel, Result,
};
