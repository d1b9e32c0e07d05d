//! Retrieval-augmented conversation session
//!
//! One `ChatSession` per user session: it owns the turn history, holds a
//! shared read-only handle to the vector index, and runs the
//! retrieve-then-generate round-trip for each question.

use std::sync::Arc;

use uuid::Uuid;

use hiwar_core::{
    ChatRequest, ChatTurn, Error, GenerationConfig, LanguageModel, Result, VectorStore,
};

/// Passages retrieved per question
pub const TOP_K: usize = 4;

/// Separator between retrieved passages in the context string
pub const CONTEXT_SEPARATOR: &str = " \n ";

/// Maximum question length, enforced again at the input boundary
pub const MAX_QUERY_CHARS: usize = 300;

/// Default history cap in turns. Every generation call carries the full
/// history, so it has to stay inside the model's context budget.
pub const DEFAULT_MAX_HISTORY_TURNS: usize = 40;

/// Fixed persona instruction for every generation call
pub const SYSTEM_PROMPT: &str = "You are HiwarBot, an Islamic chatbot designed to help users learn about Islam. \
     You should provide answers that are informative, respectful, and based on authentic Islamic teachings. \
     Only respond to questions that are directly related to Islam, and do so in English only. \
     If a query is unrelated to Islam or in a different language, politely inform the user that you can only answer questions about Islam in English. \
     Make sure to clarify any terms or concepts that might be unfamiliar to non-Muslims. \
     The context provided includes dialogue chats between an agent and a visitor. \
     Use this context to inform your responses and maintain a conversational tone. \
     If you cannot provide an answer based on the context, state: 'I'm sorry, I can't answer this question at the moment. Please consult a knowledgeable person or a reliable source for accurate information.'";

/// Reject empty and over-length questions before any collaborator runs
pub fn validate_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(Error::InvalidInput("question is empty".to_string()));
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(Error::InvalidInput(format!(
            "question exceeds {} characters",
            MAX_QUERY_CHARS
        )));
    }
    Ok(())
}

/// A conversation session over one language model and a shared vector index
pub struct ChatSession<L: LanguageModel, V: VectorStore> {
    id: Uuid,
    llm: L,
    store: Arc<V>,
    history: Vec<ChatTurn>,
    max_history_turns: usize,
}

impl<L: LanguageModel, V: VectorStore> ChatSession<L, V> {
    /// Create a session with the default history cap
    pub fn new(llm: L, store: Arc<V>) -> Self {
        Self {
            id: Uuid::new_v4(),
            llm,
            store,
            history: Vec::new(),
            max_history_turns: DEFAULT_MAX_HISTORY_TURNS,
        }
    }

    /// Override the history cap (rounded down to an even turn count)
    pub fn with_history_limit(mut self, max_turns: usize) -> Self {
        self.max_history_turns = max_turns.max(2) & !1;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// Run one retrieval-augmented round-trip.
    ///
    /// On success exactly two turns (user, then assistant) are appended to
    /// the history and returned. On any failure the history is untouched,
    /// so it never ends on an unanswered user turn.
    pub async fn ask(&mut self, query: &str) -> Result<(ChatTurn, ChatTurn)> {
        validate_query(query)?;

        let passages = self.store.search(query, TOP_K).await?;

        // Zero passages is fine; generation proceeds with empty context
        let context = passages
            .iter()
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);

        let request = ChatRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            history: self.history.clone(),
            user_prompt: format!(
                "Generate a response based on the following context: {} Query: {}",
                context, query
            ),
        };

        let config = GenerationConfig {
            model_id: self.llm.model_id().to_string(),
            ..Default::default()
        };

        let result = match self.llm.generate_with_config(&request, &config).await {
            Ok(result) => result,
            // One retry for connectivity-level failures, then surface
            Err(e) if e.is_transient() => {
                self.llm.generate_with_config(&request, &config).await?
            }
            Err(e) => return Err(e),
        };

        let user_turn = ChatTurn::user(query);
        let assistant_turn = ChatTurn::assistant(result.text);

        self.history.push(user_turn.clone());
        self.history.push(assistant_turn.clone());
        self.evict_oldest();

        Ok((user_turn, assistant_turn))
    }

    /// Drop oldest user/assistant pairs past the cap, keeping alternation
    fn evict_oldest(&mut self) {
        while self.history.len() > self.max_history_turns {
            self.history.drain(..2);
        }
    }
}
