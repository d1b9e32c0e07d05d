//! Conversation turn types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One message in a conversation, immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Everything a backend needs for one generation round-trip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Fixed persona instruction
    pub system_prompt: String,
    /// Prior turns, oldest first; does not include `user_prompt`
    pub history: Vec<ChatTurn>,
    /// Templated user message carrying retrieved context plus the query
    pub user_prompt: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_constructors_set_roles() {
        let user = ChatTurn::user("What is Zakat?");
        assert_eq!(user.role, ChatRole::User);
        assert_eq!(user.content, "What is Zakat?");

        let bot = ChatTurn::assistant("Zakat is obligatory charity.");
        assert_eq!(bot.role, ChatRole::Assistant);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ChatRole::User).unwrap(),
            "\"user\""
        );
        assert_eq!(
            serde_json::to_string(&ChatRole::Assistant).unwrap(),
            "\"assistant\""
        );
    }
}
