//! Core traits and types for HiwarBot
//!
//! This crate defines the fundamental traits and types used across the
//! HiwarBot system. It provides capability-facing interfaces for language
//! model backends and vector stores, making the conversation core
//! test-friendly and backend-agnostic.

pub mod chat;
pub mod error;
pub mod llm;
pub mod vector_store;

pub use chat::{ChatRequest, ChatRole, ChatTurn};
pub use error::{Error, Result};
pub use llm::{GenerationConfig, GenerationResult, LanguageModel};
pub use vector_store::{ScoredPassage, VectorStore};
