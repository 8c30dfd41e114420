//! Chat agent for product suitability questions.
//!
//! A request flows through a constrained loop:
//! 1. **Retrieval** (`context`): the active product plus lexical and semantic
//!    hits become a short briefing.
//! 2. **Model turn** (`llm`, `conversation`): the model answers with a JSON
//!    directive, either a tool call or a final response.
//! 3. **Tools** (`tools`): catalog search, product detail and the
//!    deterministic suitability rules.
//!
//! The model never decides suitability itself. Verdicts come from
//! `surfacefit_core::suitability`.

pub mod context;
pub mod conversation;
pub mod llm;
pub mod runtime;
pub mod semantic;
pub mod tools;

pub use conversation::{ChatMessage, ConversationTurn, Role};
pub use llm::{Embedder, LlmClient, OllamaClient};
pub use runtime::{AgentRuntime, ChatRequest, ChatResponse};
pub use semantic::{build_index, IndexBuildSummary, IndexError, LazyEmbeddingIndex, SemanticIndex};
