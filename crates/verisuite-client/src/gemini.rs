//! Gemini generateContent client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::{ModelClient, ModelRequest, ModelResponse, TokenUsage};
use crate::error::{ClientError, ClientResult};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Client for Google Gemini models.
pub struct GeminiClient {
    model: String,
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl GeminiClient {
    /// Create a client for `model`, reading the API key from `GEMINI_API_KEY`.
    pub fn new(model: impl Into<String>) -> ClientResult<Self> {
        let api_key = std::env::var(API_KEY_VAR).map_err(|_| ClientError::MissingApiKey {
            var: API_KEY_VAR.to_string(),
        })?;
        Ok(Self::with_credentials(model, DEFAULT_BASE_URL, api_key))
    }

    /// Create a client against an explicit endpoint. Used for tests.
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
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: CandidateContent,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, request: &ModelRequest) -> ClientResult<ModelResponse> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            system_instruction: request.system_prompt.as_deref().map(|text| Content {
                parts: vec![Part { text }],
            }),
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!(model = %self.model, url = %url, "generateContent request");

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
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

        let body: GenerateContentResponse = response.json().await?;
        let candidate = body
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::MalformedResponse {
                detail: "no candidates in response".to_string(),
            })?;

        let content = candidate
            .content
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        let usage = body
            .usage_metadata
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            })
            .unwrap_or_default();

        Ok(ModelResponse {
            content,
            model: self.model.clone(),
            usage,
            finish_reason: candidate
                .finish_reason
                .map(|r| r.to_ascii_lowercase())
                .unwrap_or_else(|| "stop".to_string()),
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
