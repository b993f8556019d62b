pub mod openai;

pub use openai::OpenAIClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Message {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Failure at an external provider boundary. The agent core never lets one
/// of these cross a capability boundary; providers absorb them into
/// documented fallback values.
#[derive(Debug, Clone)]
pub enum ProviderError {
    /// Transport-level failure (DNS, connect, timeout, read).
    Network(String),
    /// The remote service answered with an error status or error payload.
    Api(String),
    /// The response arrived but did not have the expected shape.
    Malformed(String),
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Network(msg) => write!(f, "network error: {}", msg),
            ProviderError::Api(msg) => write!(f, "provider error: {}", msg),
            ProviderError::Malformed(msg) => write!(f, "malformed response: {}", msg),
        }
    }
}

/// One text-completion request against the configured model.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    /// Ask the model for a single JSON object instead of free text.
    pub json_object: bool,
}

impl CompletionRequest {
    pub fn text(prompt: impl Into<String>, max_tokens: u32) -> Self {
        CompletionRequest {
            prompt: prompt.into(),
            max_tokens,
            temperature: None,
            json_object: false,
        }
    }

    pub fn json(prompt: impl Into<String>, max_tokens: u32) -> Self {
        CompletionRequest {
            prompt: prompt.into(),
            max_tokens,
            temperature: None,
            json_object: true,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Seam between the agent core and the completion model, so tests can run
/// the full loop against scripted backends.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError>;
}
