use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SYSTEM_DIRECTIVE: &str = r#"You are SurfaceFit, an assistant for flooring, tile and stone products.
- Always ground answers in the provided context or tool outputs. If you do not have enough information, say so.
- To use a tool, respond ONLY with JSON of the form:
  {"action":"call_tool","tool_name":"search_products","arguments":{"query":"..."}}.
- When you can answer the customer, respond with:
  {"action":"final_response","content":"<answer>"}.
- Never fabricate product ids or specs. Prefer citing product ids explicitly.
- Tools available:
  * search_products(query: string, limit?: int) -> find matching products.
  * get_product_detail(product_id: string) -> detailed product attributes.
  * check_usage(product_id: string, use_case: string) -> run the suitability rules for one scenario.
- After receiving tool results you may call another tool or return the final response.
"#;

pub const JSON_REMINDER: &str = "Remember: respond with JSON as described earlier.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message as sent to the LLM.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// A message from the caller's chat history. Roles are free text; only
/// `user` and `assistant` turns are forwarded to the model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self { role: role.into(), content: content.into() }
    }

    fn forwarded_role(&self) -> Option<Role> {
        match self.role.as_str() {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

pub fn build_conversation(history: &[ChatMessage], briefing: &str) -> Vec<ConversationTurn> {
    let mut conversation = vec![ConversationTurn::system(SYSTEM_DIRECTIVE)];
    if !briefing.is_empty() {
        conversation.push(ConversationTurn::system(briefing));
    }
    conversation.extend(history.iter().filter_map(|message| {
        message.forwarded_role().map(|role| ConversationTurn::new(role, message.content.clone()))
    }));
    conversation.push(ConversationTurn::system(JSON_REMINDER));
    conversation
}

pub fn tool_result_turn(tool_name: &str, payload: &Value) -> ConversationTurn {
    ConversationTurn::system(format!(
        "Tool {tool_name} result:\n{payload}\nRespond with another JSON directive."
    ))
}

/// What the model asked for in one reply.
#[derive(Clone, Debug, PartialEq)]
pub enum AgentIntent {
    CallTool { tool_name: String, arguments: Map<String, Value> },
    FinalAnswer { content: String },
}

#[derive(Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum Directive {
    CallTool {
        #[serde(default)]
        tool_name: String,
        #[serde(default)]
        arguments: Value,
    },
    FinalResponse {
        #[serde(default)]
        content: Option<String>,
    },
}

/// Interprets raw model output. Never fails: anything that is not a
/// recognizable directive becomes the final answer as-is.
pub fn parse_intent(raw: &str) -> AgentIntent {
    let trimmed = raw.trim();
    let directive = serde_json::from_str::<Directive>(trimmed)
        .ok()
        .or_else(|| embedded_object(trimmed).and_then(|json| serde_json::from_str(json).ok()));

    match directive {
        Some(Directive::CallTool { tool_name, arguments }) => AgentIntent::CallTool {
            tool_name,
            arguments: match arguments {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        },
        Some(Directive::FinalResponse { content }) => {
            let content = content.filter(|content| !content.is_empty()).unwrap_or_else(|| raw.to_string());
            AgentIntent::FinalAnswer { content: content.trim().to_string() }
        }
        None => AgentIntent::FinalAnswer { content: trimmed.to_string() },
    }
}

/// Widest `{ ... }` span, for replies that wrap the JSON in prose or fences.
fn embedded_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}
