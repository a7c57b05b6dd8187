//! Per-conversation orchestration: intent routing, collaborator
//! fallback handling, and turn history.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::warn;

use orderly_core::domain::resolution::ResolutionPayload;
use orderly_core::store::OrderStore;

use crate::conversation::{Intent, IntentClassifier};
use crate::llm::{LlmClient, SYSTEM_INSTRUCTION};
use crate::resolver::LogisticsResolver;

/// Reply used when the generative collaborator fails or times out. The
/// collaborator's error is logged but never surfaced to the end user.
pub const GENERATIVE_FALLBACK_REPLY: &str = "I'm here to help! For order tracking, please \
     provide your order number. For other questions, I'll do my best to assist you.";

/// Reply used when the order store is unreachable during a logistics
/// turn.
pub const STORE_UNAVAILABLE_REPLY: &str = "Sorry, I'm having trouble reaching order records \
     right now. Please try again in a few minutes.";

const GREETING: &str = "Hello! I'm your customer support assistant.\n\nI can help you with:\n\
     - Order tracking (e.g., \"Where is my order #123?\")\n\
     - Delivery status updates\n\
     - Product inquiries\n\
     - General support questions\n\nHow can I assist you today?";

const SAMPLE_QUERIES: &[&str] = &[
    "Where is my order #1?",
    "What's the status of my order #2?",
    "When will my earbuds arrive?",
    "Track my delivery",
    "Who are you?",
    "What's your return policy?",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Logistics,
    Generative,
    Unknown,
}

/// One entry in the conversation history. User turns carry
/// [`ResponseSource::Unknown`]; assistant turns record which collaborator
/// produced the reply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub source: ResponseSource,
}

/// Reply envelope for one turn. `success` reflects the user-facing
/// contract - the session always produces a reply - so it stays true
/// even when a collaborator failed behind the scenes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TurnReply {
    pub success: bool,
    pub message: String,
    pub source: ResponseSource,
    pub data: Option<ResolutionPayload>,
}

/// One conversation's state. Sessions are independent: history is scoped
/// to the session object, and concurrent sessions share only the
/// read-only store and generative client handles.
pub struct ConversationSession {
    classifier: IntentClassifier,
    resolver: LogisticsResolver,
    llm: Arc<dyn LlmClient>,
    llm_timeout: Duration,
    history: Vec<ConversationTurn>,
}

impl ConversationSession {
    pub fn new(store: Arc<dyn OrderStore>, llm: Arc<dyn LlmClient>, llm_timeout: Duration) -> Self {
        Self {
            classifier: IntentClassifier::new(),
            resolver: LogisticsResolver::new(store),
            llm,
            llm_timeout,
            history: Vec::new(),
        }
    }

    /// Handle one user turn: record it, route by intent, record the
    /// reply. Never errors - every collaborator failure ends in fallback
    /// copy.
    pub async fn handle_turn(&mut self, text: &str) -> TurnReply {
        self.push_turn(TurnRole::User, text.to_string(), ResponseSource::Unknown);

        let reply = match self.classifier.classify(text) {
            Intent::OrderRelated => self.logistics_reply(text).await,
            Intent::General => self.generative_reply(text).await,
        };

        self.push_turn(TurnRole::Assistant, reply.message.clone(), reply.source);
        reply
    }

    /// Read-only snapshot of the turn history, in chronological order.
    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    /// Reset the history. Affects subsequent turns only; replies already
    /// returned to earlier callers are untouched.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn greeting_message() -> &'static str {
        GREETING
    }

    pub fn sample_queries() -> &'static [&'static str] {
        SAMPLE_QUERIES
    }

    fn push_turn(&mut self, role: TurnRole, text: String, source: ResponseSource) {
        self.history.push(ConversationTurn { role, text, timestamp: Utc::now(), source });
    }

    async fn logistics_reply(&self, text: &str) -> TurnReply {
        match self.resolver.resolve(text).await {
            Ok(resolution) => TurnReply {
                success: true,
                message: resolution.message,
                source: ResponseSource::Logistics,
                data: resolution.payload,
            },
            Err(error) => {
                warn!(error = %error, "order store failed during a logistics turn");
                TurnReply {
                    success: true,
                    message: STORE_UNAVAILABLE_REPLY.to_string(),
                    source: ResponseSource::Logistics,
                    data: None,
                }
            }
        }
    }

    async fn generative_reply(&self, text: &str) -> TurnReply {
        let message = match timeout(
            self.llm_timeout,
            self.llm.complete(SYSTEM_INSTRUCTION, text),
        )
        .await
        {
            Ok(Ok(reply)) => reply,
            Ok(Err(error)) => {
                warn!(error = %error, "generative collaborator failed; using fallback reply");
                GENERATIVE_FALLBACK_REPLY.to_string()
            }
            Err(_elapsed) => {
                warn!(
                    timeout_secs = self.llm_timeout.as_secs(),
                    "generative collaborator timed out; using fallback reply"
                );
                GENERATIVE_FALLBACK_REPLY.to_string()
            }
        };

        TurnReply {
            success: true,
            message,
            source: ResponseSource::Generative,
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    use orderly_core::domain::customer::{CustomerId, CustomerRecord};
    use orderly_core::domain::order::{OrderId, OrderRecord};
    use orderly_core::domain::shipment::ShipmentRecord;
    use orderly_core::domain::view::ResolvedOrderView;
    use orderly_core::store::{OrderStore, StoreError};
    use orderly_db::InMemoryOrderStore;

    use crate::llm::LlmClient;

    use super::{
        ConversationSession, ResponseSource, TurnRole, GENERATIVE_FALLBACK_REPLY,
        STORE_UNAVAILABLE_REPLY,
    };

    struct StubLlm {
        reply: &'static str,
        calls: AtomicUsize,
    }

    impl StubLlm {
        fn new(reply: &'static str) -> Arc<Self> {
            Arc::new(Self { reply, calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl LlmClient for StubLlm {
        async fn complete(&self, _system_instruction: &str, _user_text: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.to_string())
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmClient for FailingLlm {
        async fn complete(&self, _system_instruction: &str, _user_text: &str) -> Result<String> {
            Err(anyhow!("upstream returned status 500"))
        }
    }

    struct HangingLlm;

    #[async_trait]
    impl LlmClient for HangingLlm {
        async fn complete(&self, _system_instruction: &str, _user_text: &str) -> Result<String> {
            std::future::pending::<()>().await;
            unreachable!("pending future never resolves")
        }
    }

    /// Store wrapper that counts lookups so tests can assert a turn
    /// never touched storage.
    struct CountingStore {
        inner: InMemoryOrderStore,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OrderStore for CountingStore {
        async fn find_order_view(
            &self,
            order_id: OrderId,
        ) -> Result<Option<ResolvedOrderView>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_order_view(order_id).await
        }

        async fn find_orders_by_customer_email(
            &self,
            email: &str,
        ) -> Result<Vec<ResolvedOrderView>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_orders_by_customer_email(email).await
        }

        async fn find_orders_by_customer_name_fragment(
            &self,
            fragment: &str,
        ) -> Result<Vec<ResolvedOrderView>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_orders_by_customer_name_fragment(fragment).await
        }

        async fn find_orders_by_product_fragment(
            &self,
            fragment: &str,
        ) -> Result<Vec<ResolvedOrderView>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_orders_by_product_fragment(fragment).await
        }
    }

    struct FailingStore;

    #[async_trait]
    impl OrderStore for FailingStore {
        async fn find_order_view(
            &self,
            _order_id: OrderId,
        ) -> Result<Option<ResolvedOrderView>, StoreError> {
            Err(StoreError::Unavailable("database locked".to_string()))
        }

        async fn find_orders_by_customer_email(
            &self,
            _email: &str,
        ) -> Result<Vec<ResolvedOrderView>, StoreError> {
            Err(StoreError::Unavailable("database locked".to_string()))
        }

        async fn find_orders_by_customer_name_fragment(
            &self,
            _fragment: &str,
        ) -> Result<Vec<ResolvedOrderView>, StoreError> {
            Err(StoreError::Unavailable("database locked".to_string()))
        }

        async fn find_orders_by_product_fragment(
            &self,
            _fragment: &str,
        ) -> Result<Vec<ResolvedOrderView>, StoreError> {
            Err(StoreError::Unavailable("database locked".to_string()))
        }
    }

    fn demo_view() -> ResolvedOrderView {
        ResolvedOrderView {
            order: OrderRecord {
                order_id: OrderId(1),
                product_name: "Wireless Earbuds".to_string(),
                delivery_status: "In Transit".to_string(),
                expected_date: Some("2024-01-10".to_string()),
                order_date: Some("2024-01-03".to_string()),
            },
            customer: Some(CustomerRecord {
                id: CustomerId(1),
                name: "John Doe".to_string(),
                email: "john.doe@email.com".to_string(),
            }),
            shipment: Some(ShipmentRecord {
                tracking_id: "TRK001".to_string(),
                order_id: OrderId(1),
                current_location: "Bangalore Hub".to_string(),
                last_update: "2024-01-08 09:30".to_string(),
            }),
        }
    }

    fn session_with(store: Arc<dyn OrderStore>, llm: Arc<dyn LlmClient>) -> ConversationSession {
        ConversationSession::new(store, llm, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn history_grows_by_two_per_turn_in_chronological_order() {
        let mut session = session_with(
            Arc::new(InMemoryOrderStore::with_views(vec![demo_view()])),
            StubLlm::new("Happy to help."),
        );

        session.handle_turn("Where is my order #1?").await;
        session.handle_turn("Who are you?").await;
        session.handle_turn("track my earbuds").await;

        let history = session.history();
        assert_eq!(history.len(), 6);
        for pair in history.chunks(2) {
            assert_eq!(pair[0].role, TurnRole::User);
            assert_eq!(pair[0].source, ResponseSource::Unknown);
            assert_eq!(pair[1].role, TurnRole::Assistant);
        }
        for window in history.windows(2) {
            assert!(window[0].timestamp <= window[1].timestamp);
        }
    }

    #[tokio::test]
    async fn clear_history_resets_and_subsequent_turns_start_fresh() {
        let mut session = session_with(
            Arc::new(InMemoryOrderStore::with_views(vec![demo_view()])),
            StubLlm::new("Happy to help."),
        );

        session.handle_turn("Where is my order #1?").await;
        assert_eq!(session.history().len(), 2);

        session.clear_history();
        assert!(session.history().is_empty());

        session.handle_turn("Who are you?").await;
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[0].text, "Who are you?");
    }

    #[tokio::test]
    async fn order_turn_routes_to_logistics_with_the_status_message() {
        let mut session = session_with(
            Arc::new(InMemoryOrderStore::with_views(vec![demo_view()])),
            StubLlm::new("unused"),
        );

        let reply = session.handle_turn("Where is my order #1?").await;

        assert!(reply.success);
        assert_eq!(reply.source, ResponseSource::Logistics);
        assert_eq!(
            reply.message,
            "Your Wireless Earbuds (Order #1) is currently in transit and located at \
             Bangalore Hub. Expected delivery: 2024-01-10."
        );
        assert!(reply.data.is_some());
    }

    #[tokio::test]
    async fn general_turn_reaches_the_generative_client_and_never_the_store() {
        let store = Arc::new(CountingStore {
            inner: InMemoryOrderStore::with_views(vec![demo_view()]),
            calls: AtomicUsize::new(0),
        });
        let llm = StubLlm::new("We offer 30-day returns.");
        let mut session = session_with(store.clone(), llm.clone());

        let reply = session.handle_turn("What's your return policy?").await;

        assert!(reply.success);
        assert_eq!(reply.source, ResponseSource::Generative);
        assert_eq!(reply.message, "We offer 30-day returns.");
        assert!(reply.data.is_none());
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn generative_failure_is_masked_behind_the_fallback_reply() {
        let mut session = session_with(
            Arc::new(InMemoryOrderStore::new()),
            Arc::new(FailingLlm),
        );

        let reply = session.handle_turn("Who are you?").await;

        assert!(reply.success, "collaborator failure must not surface as an error");
        assert_eq!(reply.source, ResponseSource::Generative);
        assert_eq!(reply.message, GENERATIVE_FALLBACK_REPLY);
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn generative_timeout_takes_the_fallback_path() {
        let mut session = ConversationSession::new(
            Arc::new(InMemoryOrderStore::new()),
            Arc::new(HangingLlm),
            Duration::from_secs(1),
        );

        let reply = session.handle_turn("Tell me about your company").await;

        assert!(reply.success);
        assert_eq!(reply.message, GENERATIVE_FALLBACK_REPLY);
        assert_eq!(reply.source, ResponseSource::Generative);
    }

    #[tokio::test]
    async fn store_outage_is_masked_and_the_turn_is_still_recorded() {
        let mut session = session_with(Arc::new(FailingStore), StubLlm::new("unused"));

        let reply = session.handle_turn("Where is my order #1?").await;

        assert!(reply.success);
        assert_eq!(reply.source, ResponseSource::Logistics);
        assert_eq!(reply.message, STORE_UNAVAILABLE_REPLY);
        assert!(reply.data.is_none());
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn greeting_and_sample_queries_are_exposed_for_the_chat_surface() {
        assert!(ConversationSession::greeting_message().contains("customer support"));
        assert!(ConversationSession::sample_queries().contains(&"Where is my order #1?"));
    }
}
