//! Model client contract.
//!
//! A `ModelClient` accepts a prompt plus optional system-prompt text and
//! returns the response text with token usage and finish reason. Retry and
//! timeout policy belongs to the client implementation; the harness never
//! retries on its own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClientResult;

/// A single model invocation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelRequest {
    /// User prompt text.
    pub prompt: String,

    /// Optional system-prompt text, applied ahead of the user prompt.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl ModelRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// A model invocation response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelResponse {
    /// Response text.
    pub content: String,

    /// Resolved model name that produced the response.
    pub model: String,

    /// Token usage for the invocation.
    pub usage: TokenUsage,

    /// Provider-reported finish reason (e.g. "stop", "length").
    pub finish_reason: String,
}

/// Client for a model provider.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send one prompt and return the response.
    async fn generate(&self, request: &ModelRequest) -> ClientResult<ModelResponse>;

    /// The model this client targets.
    fn model(&self) -> &str;
}
