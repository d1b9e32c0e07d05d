//! watsonx.ai integration for HiwarBot
//!
//! This crate provides the watsonx implementation of the LanguageModel trait.

mod client;
mod config;


pub use client::WatsonxClient;
pub use config::WatsonxConfig;

// Re-export core types for convenience
pub use hiwar_core::{
    ChatRequest, Error, GenerationConfig, GenerationResult, LanguageModel, Result,
};
