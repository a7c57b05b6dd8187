//! Generative-text collaborator: a pluggable completion seam plus the
//! OpenAI-compatible HTTP implementation and the keyless static
//! responder.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use orderly_core::config::LlmConfig;

/// Fixed, brevity-oriented system instruction sent with every general
/// query.
pub const SYSTEM_INSTRUCTION: &str = "You are a helpful customer support assistant for an \
     e-commerce company. Keep responses brief (1-2 sentences), friendly, and professional. \
     For order-specific questions, ask for order numbers. For general questions, provide \
     helpful information about policies, company info, etc.";

/// Reply used when no generative credentials are configured at all.
pub const NO_CREDENTIALS_REPLY: &str = "I'm a customer support assistant. For order-related \
     queries, please provide your order number. For general questions, please contact our \
     support team.";

const MAX_COMPLETION_TOKENS: u32 = 100;
const COMPLETION_TEMPERATURE: f32 = 0.7;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system_instruction: &str, user_text: &str) -> Result<String>;
}

/// HTTP client for an OpenAI-compatible `chat/completions` endpoint.
/// Transport failures are retried up to the configured budget; every
/// other failure (non-2xx, malformed body) surfaces to the caller, which
/// masks it behind fallback copy.
pub struct OpenAiChatClient {
    http: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    max_retries: u32,
}

impl OpenAiChatClient {
    pub fn new(config: &LlmConfig, api_key: SecretString) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build the generative HTTP client")?;

        Ok(Self {
            http,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_retries: config.max_retries,
        })
    }

    async fn try_complete(&self, url: &str, request: &ChatRequest<'_>) -> Result<String> {
        let response = self
            .http
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .json(request)
            .send()
            .await
            .context("chat completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("chat completion returned status {status}"));
        }

        let body: ChatResponse =
            response.json().await.context("chat completion body was not valid JSON")?;
        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("chat completion had no choices"))?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl LlmClient for OpenAiChatClient {
    async fn complete(&self, system_instruction: &str, user_text: &str) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system_instruction },
                ChatMessage { role: "user", content: user_text },
            ],
            max_tokens: MAX_COMPLETION_TOKENS,
            temperature: COMPLETION_TEMPERATURE,
        };

        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            match self.try_complete(&url, &request).await {
                Ok(reply) => return Ok(reply),
                Err(error) => {
                    debug!(attempt, error = %error, "chat completion attempt failed");
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("chat completion failed")))
    }
}

/// Keyless mode: answers every general query with the static support
/// reply instead of calling out.
#[derive(Clone, Debug, Default)]
pub struct NoopLlmClient;

#[async_trait]
impl LlmClient for NoopLlmClient {
    async fn complete(&self, _system_instruction: &str, _user_text: &str) -> Result<String> {
        Ok(NO_CREDENTIALS_REPLY.to_string())
    }
}

/// Select the client the configuration calls for: HTTP-backed when an
/// API key is present, the static responder otherwise.
pub fn client_from_config(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    match config.api_key.clone() {
        Some(api_key) if !api_key.expose_secret().trim().is_empty() => {
            Ok(Arc::new(OpenAiChatClient::new(config, api_key)?))
        }
        _ => Ok(Arc::new(NoopLlmClient)),
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}
