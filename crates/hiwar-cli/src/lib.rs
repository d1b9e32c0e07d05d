//! Terminal interface and conversation session for HiwarBot

mod session;
mod ui;

#[cfg(test)]
mod tests;

pub use session::{
    validate_query, ChatSession, CONTEXT_SEPARATOR, DEFAULT_MAX_HISTORY_TURNS, MAX_QUERY_CHARS,
    SYSTEM_PROMPT, TOP_K,
};
pub use ui::{display_banner, print_help, read_question, render_error, render_turn};

// Re-export core types
pub use hiwar_core::{Error, Result};
