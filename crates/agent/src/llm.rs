use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use surfacefit_core::config::LlmConfig;

use crate::conversation::ConversationTurn;

/// Chat completion backend. Returns the assistant content of one reply.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn chat(&self, conversation: &[ConversationTurn]) -> Result<String>;
}

/// Text embedding backend used by the semantic index.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Client for a local (or proxied) Ollama instance.
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    embedding_model: String,
    temperature: f32,
    api_key: Option<SecretString>,
}

impl OllamaClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build LLM HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            embedding_model: config.embedding_model.clone(),
            temperature: config.temperature,
            api_key: config.api_key.clone(),
        })
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.http.post(&url).json(body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request.send().await.with_context(|| format!("failed to reach {url}"))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("LLM request to {path} failed ({status}): {text}");
        }

        response.json().await.with_context(|| format!("failed to decode response from {path}"))
    }
}

#[derive(Debug, Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: &'a [ConversationTurn],
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    message: Option<ChatReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingBody<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingReply {
    #[serde(default)]
    embedding: Vec<f32>,
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn chat(&self, conversation: &[ConversationTurn]) -> Result<String> {
        let body = ChatBody {
            model: &self.model,
            messages: conversation,
            stream: false,
            options: ChatOptions { temperature: self.temperature },
        };
        let reply: ChatReply = self.post("/api/chat", &body).await?;

        match reply.message.and_then(|message| message.content) {
            Some(content) if !content.is_empty() => Ok(content),
            _ => bail!("LLM response did not include message content"),
        }
    }
}

#[async_trait]
impl Embedder for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = EmbeddingBody { model: &self.embedding_model, prompt: text };
        let reply: EmbeddingReply = self.post("/api/embeddings", &body).await?;

        if reply.embedding.is_empty() {
            bail!("embedding response for model `{}` was empty", self.embedding_model);
        }
        Ok(reply.embedding)
    }
}
