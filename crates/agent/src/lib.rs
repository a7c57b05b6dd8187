//! Query understanding and resolution for the Orderly support pipeline.
//!
//! This crate is the "brain" of the system:
//! - **Text understanding** (`conversation`) - ordered pattern tables for
//!   order references, product keywords, and intent classification
//! - **Resolution** (`resolver`) - turns one query into a
//!   `QueryResolution` via the `OrderStore` collaborator
//! - **Generative fallback** (`llm`) - pluggable `LlmClient` for
//!   everything that is not order-related
//! - **Orchestration** (`session`) - per-conversation turn handling and
//!   history
//!
//! # Safety principle
//!
//! The generative collaborator never answers order questions. Order
//! status always comes from a deterministic store lookup rendered
//! through fixed templates; the LLM is reached only when the classifier
//! says a query is not order-related, and its failures never surface to
//! the end user.

pub mod conversation;
pub mod llm;
pub mod resolver;
pub mod session;

pub use conversation::{Intent, IntentClassifier, ProductMatcher, ReferenceExtractor};
pub use llm::{LlmClient, NoopLlmClient, OpenAiChatClient};
pub use resolver::LogisticsResolver;
pub use session::{ConversationSession, ConversationTurn, ResponseSource, TurnReply, TurnRole};
