//! OpenAI-style chat-completions client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::{ModelClient, ModelRequest, ModelResponse, TokenUsage};
use crate::error::{ClientError, ClientResult};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Client for OpenAI-compatible chat-completions endpoints.
pub struct OpenAiClient {
    model: String,
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client for `model`, reading the API key from `OPENAI_API_KEY`.
    pub fn new(model: impl Into<String>) -> ClientResult<Self> {
        let api_key = std::env::var(API_KEY_VAR).map_err(|_| ClientError::MissingApiKey {
            var: API_KEY_VAR.to_string(),
        })?;
        Ok(Self::with_credentials(model, DEFAULT_BASE_URL, api_key))
    }

    /// Create a client against an explicit endpoint. Used for
    /// OpenAI-compatible gateways and for tests.
    pub fn with_credentials(
        model: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    model: Option<String>,
    choices: Vec<ChatChoice>,
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn generate(&self, request: &ModelRequest) -> ClientResult<ModelResponse> {
        let mut messages = Vec::new();
        if let Some(system) = &request.system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %self.model, url = %url, "chat completion request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&ChatCompletionRequest {
                model: &self.model,
                messages,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let body: ChatCompletionResponse = response.json().await?;
        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::MalformedResponse {
                detail: "no choices in completion".to_string(),
            })?;

        Ok(ModelResponse {
            content: choice.message.content.unwrap_or_default(),
            model: body.model.unwrap_or_else(|| self.model.clone()),
            usage: body.usage.unwrap_or_default(),
            finish_reason: choice.finish_reason.unwrap_or_else(|| "stop".to_string()),
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
