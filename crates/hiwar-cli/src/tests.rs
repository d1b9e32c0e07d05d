//! Conversation session tests against mock collaborators

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use hiwar_core::{
    ChatRequest, ChatRole, Error, GenerationConfig, GenerationResult, LanguageModel, Result,
    ScoredPassage, VectorStore,
};

use crate::session::{validate_query, ChatSession, MAX_QUERY_CHARS, TOP_K};

struct MockStore {
    passages: Vec<ScoredPassage>,
    fail: bool,
    requested_k: Arc<Mutex<Vec<usize>>>,
}

impl MockStore {
    fn with_passages(contents: &[&str]) -> Self {
        Self {
            passages: contents
                .iter()
                .enumerate()
                .map(|(i, c)| ScoredPassage {
                    content: c.to_string(),
                    score: 1.0 - i as f32 * 0.1,
                })
                .collect(),
            fail: false,
            requested_k: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn empty() -> Self {
        Self::with_passages(&[])
    }

    fn failing() -> Self {
        Self {
            passages: Vec::new(),
            fail: true,
            requested_k: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl VectorStore for MockStore {
    async fn search(&self, _query: &str, top_k: usize) -> Result<Vec<ScoredPassage>> {
        self.requested_k.lock().unwrap().push(top_k);
        if self.fail {
            return Err(Error::Retrieval("index unreachable".to_string()));
        }
        Ok(self.passages.iter().take(top_k).cloned().collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.passages.len())
    }
}

struct MockModel {
    reply: String,
    // Errors returned before the canned reply, oldest first
    failures: Arc<Mutex<Vec<Error>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockModel {
    fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            failures: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn failing_with(errors: Vec<Error>) -> Self {
        let mut model = Self::replying("answer after recovery");
        model.failures = Arc::new(Mutex::new(errors));
        model
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    async fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    async fn generate(&self, request: &ChatRequest) -> Result<GenerationResult> {
        self.generate_with_config(request, &GenerationConfig::default())
            .await
    }

    async fn generate_with_config(
        &self,
        request: &ChatRequest,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        self.requests.lock().unwrap().push(request.clone());

        let mut failures = self.failures.lock().unwrap();
        if !failures.is_empty() {
            return Err(failures.remove(0));
        }

        Ok(GenerationResult {
            text: self.reply.clone(),
            model_id: config.model_id.clone(),
            tokens_used: None,
        })
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}

#[tokio::test]
async fn ask_appends_user_then_assistant() {
    let store = Arc::new(MockStore::with_passages(&["Zakat is obligatory charity."]));
    let llm = MockModel::replying("Zakat is one of the five pillars.");
    let mut session = ChatSession::new(llm, store);

    let (user, assistant) = session.ask("What is Zakat?").await.unwrap();

    assert_eq!(user.role, ChatRole::User);
    assert_eq!(user.content, "What is Zakat?");
    assert_eq!(assistant.role, ChatRole::Assistant);
    assert!(!assistant.content.is_empty());

    assert_eq!(session.history().len(), 2);
    assert_eq!(session.history()[0], user);
    assert_eq!(session.history()[1], assistant);
}

#[tokio::test]
async fn turns_alternate_over_multiple_asks() {
    let store = Arc::new(MockStore::with_passages(&["passage"]));
    let llm = MockModel::replying("an answer");
    let mut session = ChatSession::new(llm, store);

    for question in ["What is Zakat?", "What is Sawm?", "What is Hajj?"] {
        session.ask(question).await.unwrap();
    }

    assert_eq!(session.history().len(), 6);
    for (i, turn) in session.history().iter().enumerate() {
        let expected = if i % 2 == 0 {
            ChatRole::User
        } else {
            ChatRole::Assistant
        };
        assert_eq!(turn.role, expected, "turn {} has wrong role", i);
    }
}

#[tokio::test]
async fn retrieval_requests_exactly_four_passages() {
    let store = Arc::new(MockStore::with_passages(&["a", "b", "c", "d", "e"]));
    let requested_k = store.requested_k.clone();
    let llm = MockModel::replying("answer");
    let mut session = ChatSession::new(llm, store);

    session.ask("What is Zakat?").await.unwrap();
    session.ask("What is Hajj?").await.unwrap();

    assert_eq!(*requested_k.lock().unwrap(), vec![TOP_K, TOP_K]);
    assert_eq!(TOP_K, 4);
}

#[tokio::test]
async fn empty_retrieval_still_generates_with_empty_context() {
    let store = Arc::new(MockStore::empty());
    let llm = MockModel::replying("I'm sorry, I can't answer this question at the moment.");
    let requests = llm.requests.clone();
    let mut session = ChatSession::new(llm, store);

    let result = session.ask("What is Zakat?").await;
    assert!(result.is_ok());
    assert_eq!(session.history().len(), 2);

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].user_prompt,
        "Generate a response based on the following context:  Query: What is Zakat?"
    );
}

#[tokio::test]
async fn context_joins_passages_with_separator() {
    let store = Arc::new(MockStore::with_passages(&[
        "first passage",
        "second passage",
    ]));
    let llm = MockModel::replying("answer");
    let requests = llm.requests.clone();
    let mut session = ChatSession::new(llm, store);

    session.ask("What is Zakat?").await.unwrap();

    let requests = requests.lock().unwrap();
    assert!(requests[0]
        .user_prompt
        .contains("first passage \n second passage"));
}

#[tokio::test]
async fn prior_history_is_forwarded_to_the_model() {
    let store = Arc::new(MockStore::with_passages(&["passage"]));
    let llm = MockModel::replying("answer");
    let requests = llm.requests.clone();
    let mut session = ChatSession::new(llm, store);

    session.ask("What is Zakat?").await.unwrap();
    session.ask("Who must pay it?").await.unwrap();

    let requests = requests.lock().unwrap();
    assert!(requests[0].history.is_empty());
    assert_eq!(requests[1].history.len(), 2);
    assert_eq!(requests[1].history[0].content, "What is Zakat?");
    assert!(!requests[1].system_prompt.is_empty());
    assert_eq!(requests[0].system_prompt, requests[1].system_prompt);
}

#[tokio::test]
async fn generation_failure_leaves_history_unchanged() {
    let store = Arc::new(MockStore::with_passages(&["passage"]));
    let llm = MockModel::failing_with(vec![Error::Generation("quota exceeded".to_string())]);
    let requests = llm.requests.clone();
    let mut session = ChatSession::new(llm, store);

    let result = session.ask("What is Zakat?").await;
    assert!(matches!(result, Err(Error::Generation(_))));
    assert!(session.history().is_empty());

    // Non-transient failures are not retried
    assert_eq!(requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn retrieval_failure_skips_generation() {
    let store = Arc::new(MockStore::failing());
    let llm = MockModel::replying("never used");
    let requests = llm.requests.clone();
    let mut session = ChatSession::new(llm, store);

    let result = session.ask("What is Zakat?").await;
    assert!(matches!(result, Err(Error::Retrieval(_))));
    assert!(session.history().is_empty());
    assert!(requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn transient_failure_is_retried_once() {
    let store = Arc::new(MockStore::with_passages(&["passage"]));
    let llm = MockModel::failing_with(vec![Error::Network("connection reset".to_string())]);
    let requests = llm.requests.clone();
    let mut session = ChatSession::new(llm, store);

    let result = session.ask("What is Zakat?").await;
    assert!(result.is_ok());
    assert_eq!(session.history().len(), 2);
    assert_eq!(requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn persistent_transient_failure_surfaces_after_one_retry() {
    let store = Arc::new(MockStore::with_passages(&["passage"]));
    let llm = MockModel::failing_with(vec![
        Error::Network("connection reset".to_string()),
        Error::Timeout("60s".to_string()),
    ]);
    let requests = llm.requests.clone();
    let mut session = ChatSession::new(llm, store);

    let result = session.ask("What is Zakat?").await;
    assert!(matches!(result, Err(Error::Timeout(_))));
    assert!(session.history().is_empty());
    assert_eq!(requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn invalid_questions_never_reach_collaborators() {
    let store = Arc::new(MockStore::with_passages(&["passage"]));
    let requested_k = store.requested_k.clone();
    let llm = MockModel::replying("answer");
    let mut session = ChatSession::new(llm, store);

    let result = session.ask("   ").await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    let over_length = "x".repeat(MAX_QUERY_CHARS + 1);
    let result = session.ask(&over_length).await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    assert!(session.history().is_empty());
    assert!(requested_k.lock().unwrap().is_empty());
}

#[tokio::test]
async fn history_cap_evicts_oldest_pair() {
    let store = Arc::new(MockStore::with_passages(&["passage"]));
    let llm = MockModel::replying("answer");
    let mut session = ChatSession::new(llm, store).with_history_limit(4);

    session.ask("first question").await.unwrap();
    session.ask("second question").await.unwrap();
    session.ask("third question").await.unwrap();

    let history = session.history();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].content, "second question");
    assert_eq!(history[0].role, ChatRole::User);
    assert_eq!(history[2].content, "third question");
}

#[test]
fn validate_query_boundaries() {
    assert!(validate_query("What is Zakat?").is_ok());
    assert!(validate_query(&"x".repeat(MAX_QUERY_CHARS)).is_ok());

    assert!(matches!(
        validate_query(""),
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        validate_query(&"x".repeat(MAX_QUERY_CHARS + 1)),
        Err(Error::InvalidInput(_))
    ));
}
