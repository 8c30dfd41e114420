use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use surfacefit_core::config::AgentConfig;
use surfacefit_core::domain::product::{ProductDetail, ProductId};
use surfacefit_core::errors::{ApplicationError, DomainError};
use surfacefit_db::CatalogRepository;

use crate::context::ContextBuilder;
use crate::conversation::{
    build_conversation, parse_intent, tool_result_turn, AgentIntent, ChatMessage, ConversationTurn,
    Role,
};
use crate::llm::LlmClient;
use crate::semantic::SemanticIndex;
use crate::tools::{AgentTool, SearchLimits};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub active_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub message: ChatMessage,
    pub referenced_products: Vec<ProductDetail>,
}

/// Runs the retrieve, ask, call-tools loop for one chat request.
pub struct AgentRuntime {
    llm: Arc<dyn LlmClient>,
    catalog: Arc<dyn CatalogRepository>,
    index: Arc<dyn SemanticIndex>,
    settings: AgentConfig,
}

impl AgentRuntime {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        catalog: Arc<dyn CatalogRepository>,
        index: Arc<dyn SemanticIndex>,
        settings: AgentConfig,
    ) -> Self {
        Self { llm, catalog, index, settings }
    }

    pub fn catalog(&self) -> &dyn CatalogRepository {
        self.catalog.as_ref()
    }

    pub async fn handle_chat(
        &self,
        request: ChatRequest,
        correlation_id: &str,
    ) -> Result<ChatResponse, ApplicationError> {
        if request.messages.is_empty() {
            return Err(DomainError::InvalidRequest("at least one message is required".to_string()).into());
        }
        let query = request
            .messages
            .iter()
            .rev()
            .find(|message| message.role == "user")
            .map(|message| message.content.as_str())
            .ok_or_else(|| {
                DomainError::InvalidRequest("conversation must include a user message".to_string())
            })?;

        self.index.ensure_ready().await?;

        let active_id = request
            .active_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ProductId::new);
        let context = ContextBuilder::new(self.catalog.as_ref(), self.index.as_ref(), self.settings.context_top_k)
            .build(query, active_id.as_ref())
            .await?;

        let mut conversation = build_conversation(&request.messages, &context.briefing);
        let mut referenced = context.details;
        let limits = SearchLimits::from(&self.settings);
        let max_tool_calls = self.settings.max_tool_calls;
        let mut executed = 0_u32;

        loop {
            let reply = self.llm.chat(&conversation).await.map_err(|error| {
                warn!(
                    event_name = "agent.llm.failed",
                    correlation_id = %correlation_id,
                    error = %format!("{error:#}"),
                    "llm call failed"
                );
                ApplicationError::Upstream(format!("{error:#}"))
            })?;

            match parse_intent(&reply) {
                AgentIntent::FinalAnswer { content } => {
                    info!(
                        event_name = "agent.chat.completed",
                        correlation_id = %correlation_id,
                        tool_calls = executed,
                        referenced = referenced.len(),
                        "chat request answered"
                    );
                    return Ok(ChatResponse {
                        message: ChatMessage::new("assistant", content),
                        referenced_products: dedupe_by_id(referenced),
                    });
                }
                AgentIntent::CallTool { tool_name, arguments } => {
                    if executed >= max_tool_calls {
                        warn!(
                            event_name = "agent.tool_budget.exhausted",
                            correlation_id = %correlation_id,
                            limit = max_tool_calls,
                            "model kept calling tools"
                        );
                        return Err(ApplicationError::ToolBudgetExhausted { limit: max_tool_calls });
                    }

                    let tool = AgentTool::parse(&tool_name, &arguments, limits)?;
                    info!(
                        event_name = "agent.tool.called",
                        correlation_id = %correlation_id,
                        tool_name = tool.name(),
                        iteration = executed + 1,
                        "executing tool"
                    );
                    let outcome = tool.execute(self.catalog.as_ref()).await?;
                    executed += 1;

                    referenced.extend(outcome.touched);
                    conversation.push(ConversationTurn::new(Role::Assistant, reply));
                    conversation.push(tool_result_turn(&tool_name, &outcome.payload));
                }
            }
        }
    }
}

fn dedupe_by_id(details: Vec<ProductDetail>) -> Vec<ProductDetail> {
    let mut seen = HashSet::new();
    details.into_iter().filter(|detail| seen.insert(detail.id().clone())).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    use surfacefit_core::config::AgentConfig;
    use surfacefit_core::domain::product::{ProductDetail, ProductId, ProductSummary};
    use surfacefit_core::errors::{ApplicationError, DomainError};
    use surfacefit_db::InMemoryCatalogRepository;

    use super::{AgentRuntime, ChatRequest};
    use crate::conversation::{ChatMessage, ConversationTurn, Role};
    use crate::llm::LlmClient;
    use crate::semantic::{SemanticHit, SemanticIndex};

    /// Replies from a fixed script and records every conversation it saw.
    struct ScriptedLlm {
        replies: Mutex<VecDeque<String>>,
        seen: Mutex<Vec<Vec<ConversationTurn>>>,
    }

    impl ScriptedLlm {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|reply| reply.to_string()).collect()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().expect("lock").len()
        }

        fn last_conversation(&self) -> Vec<ConversationTurn> {
            self.seen.lock().expect("lock").last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn chat(&self, conversation: &[ConversationTurn]) -> Result<String> {
            self.seen.lock().expect("lock").push(conversation.to_vec());
            self.replies.lock().expect("lock").pop_front().ok_or_else(|| anyhow!("script exhausted"))
        }
    }

    struct StubIndex {
        hits: Vec<&'static str>,
        ready: bool,
    }

    #[async_trait]
    impl SemanticIndex for StubIndex {
        async fn ensure_ready(&self) -> Result<(), ApplicationError> {
            if self.ready {
                Ok(())
            } else {
                Err(ApplicationError::Precondition(
                    "semantic index not found; run `surfacefit build-index`".to_string(),
                ))
            }
        }

        async fn search(&self, _query: &str, top_k: usize) -> Result<Vec<SemanticHit>, ApplicationError> {
            Ok(self
                .hits
                .iter()
                .take(top_k)
                .map(|id| SemanticHit { product_id: ProductId::new(*id), score: 1.0 })
                .collect())
        }
    }

    fn catalog() -> Arc<InMemoryCatalogRepository> {
        Arc::new(InMemoryCatalogRepository::with_products([
            ProductDetail::new(ProductSummary {
                name: Some("Grey Porcelain".to_string()),
                ..ProductSummary::new("100001")
            })
            .with_attribute("Bathroom Floor Use", "Suitable for Bathroom Floor"),
            ProductDetail::new(ProductSummary {
                name: Some("Wall Ceramic".to_string()),
                ..ProductSummary::new("100002")
            })
            .with_attribute("Bathroom Floor Use", "Not Suitable for Bathroom Floor"),
        ]))
    }

    fn runtime(llm: Arc<ScriptedLlm>, hits: Vec<&'static str>) -> AgentRuntime {
        AgentRuntime::new(llm, catalog(), Arc::new(StubIndex { hits, ready: true }), AgentConfig::default())
    }

    fn ask(text: &str) -> ChatRequest {
        ChatRequest { messages: vec![ChatMessage::new("user", text)], active_id: None }
    }

    const CHECK_USAGE: &str = r#"{"action":"call_tool","tool_name":"check_usage","arguments":{"product_id":"100002","use_case":"bathroom_floor"}}"#;

    #[tokio::test]
    async fn tool_call_then_final_answer() {
        let llm = ScriptedLlm::new(&[
            CHECK_USAGE,
            r#"{"action":"final_response","content":"No, 100002 is wall only."}"#,
        ]);
        let runtime = runtime(llm.clone(), vec!["100001"]);

        let response = runtime
            .handle_chat(ask("can I put ceramic on the bathroom floor?"), "corr-1")
            .await
            .expect("chat succeeds");

        assert_eq!(response.message, ChatMessage::new("assistant", "No, 100002 is wall only."));
        let referenced: Vec<&str> =
            response.referenced_products.iter().map(|detail| detail.id().as_str()).collect();
        assert_eq!(referenced, vec!["100001", "100002"]);

        let conversation = llm.last_conversation();
        let tool_turn = conversation.last().expect("tool result turn");
        assert_eq!(tool_turn.role, Role::System);
        assert!(tool_turn.content.starts_with("Tool check_usage result:\n"));
        assert!(tool_turn.content.contains(r#""ok":false"#));
        assert_eq!(conversation[conversation.len() - 2].content, CHECK_USAGE);
    }

    #[tokio::test]
    async fn fourth_tool_call_exhausts_the_budget() {
        let llm = ScriptedLlm::new(&[CHECK_USAGE, CHECK_USAGE, CHECK_USAGE, CHECK_USAGE, "never sent"]);
        let runtime = runtime(llm.clone(), Vec::new());

        let error = runtime.handle_chat(ask("loop forever"), "corr-2").await.expect_err("budget");

        assert_eq!(error, ApplicationError::ToolBudgetExhausted { limit: 3 });
        assert_eq!(llm.calls(), 4);
    }

    #[tokio::test]
    async fn free_text_reply_is_the_answer() {
        let llm = ScriptedLlm::new(&["  Porcelain is a great choice.\n"]);
        let runtime = runtime(llm.clone(), Vec::new());

        let response = runtime.handle_chat(ask("hello"), "corr-3").await.expect("chat succeeds");

        assert_eq!(response.message.content, "Porcelain is a great choice.");
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn referenced_products_keep_first_occurrence() {
        let llm = ScriptedLlm::new(&[
            r#"{"action":"call_tool","tool_name":"get_product_detail","arguments":{"sku":"100001"}}"#,
            r#"{"action":"final_response","content":"done"}"#,
        ]);
        let runtime = runtime(llm, vec!["100001"]);

        let request = ChatRequest {
            messages: vec![ChatMessage::new("user", "tell me about it")],
            active_id: Some("100001".to_string()),
        };
        let response = runtime.handle_chat(request, "corr-4").await.expect("chat succeeds");

        assert_eq!(response.referenced_products.len(), 1);
    }

    #[tokio::test]
    async fn requests_without_a_user_turn_are_rejected() {
        let llm = ScriptedLlm::new(&[]);
        let runtime = runtime(llm.clone(), Vec::new());

        let empty = runtime
            .handle_chat(ChatRequest { messages: Vec::new(), active_id: None }, "corr-5")
            .await
            .expect_err("empty");
        let assistant_only = runtime
            .handle_chat(
                ChatRequest { messages: vec![ChatMessage::new("assistant", "hi")], active_id: None },
                "corr-6",
            )
            .await
            .expect_err("no user turn");

        assert!(matches!(empty, ApplicationError::Domain(DomainError::InvalidRequest(_))));
        assert!(matches!(assistant_only, ApplicationError::Domain(DomainError::InvalidRequest(_))));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn missing_index_fails_before_calling_the_model() {
        let llm = ScriptedLlm::new(&["unused"]);
        let runtime = AgentRuntime::new(
            llm.clone(),
            catalog(),
            Arc::new(StubIndex { hits: Vec::new(), ready: false }),
            AgentConfig::default(),
        );

        let error = runtime.handle_chat(ask("hi"), "corr-7").await.expect_err("index missing");

        assert!(matches!(error, ApplicationError::Precondition(_)));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_tool_is_a_validation_error() {
        let llm = ScriptedLlm::new(&[r#"{"action":"call_tool","tool_name":"drop_tables","arguments":{}}"#]);
        let runtime = runtime(llm, Vec::new());

        let error = runtime.handle_chat(ask("hi"), "corr-8").await.expect_err("unsupported tool");

        assert_eq!(error, ApplicationError::Domain(DomainError::UnsupportedTool("drop_tables".to_string())));
    }

    #[tokio::test]
    async fn llm_failure_is_upstream() {
        let llm = ScriptedLlm::new(&[]);
        let runtime = runtime(llm, Vec::new());

        let error = runtime.handle_chat(ask("hi"), "corr-9").await.expect_err("script exhausted");

        assert!(matches!(error, ApplicationError::Upstream(ref message) if message.contains("script exhausted")));
    }
}
