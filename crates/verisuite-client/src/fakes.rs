//! Scripted model client for tests.
//!
//! `ScriptedClient` replays a fixed sequence of canned responses and records
//! every request it receives, so harness behavior can be tested without a
//! network.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{ModelClient, ModelRequest, ModelResponse, TokenUsage};
use crate::error::{ClientError, ClientResult};

/// Model client that returns pre-scripted responses in order.
pub struct ScriptedClient {
    model: String,
    responses: Mutex<Vec<String>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedClient {
    /// Create a client that answers with `responses`, first to last.
    pub fn new(model: impl Into<String>, responses: Vec<String>) -> Self {
        let mut reversed = responses;
        reversed.reverse(); // pop() serves them front-first
        Self {
            model: model.into(),
            responses: Mutex::new(reversed),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Client that repeats a single canned response is just a one-element
    /// script; exhausting the script is an error, mirroring a dead provider.
    pub fn single(model: impl Into<String>, response: impl Into<String>) -> Self {
        Self::new(model, vec![response.into()])
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn generate(&self, request: &ModelRequest) -> ClientResult<ModelResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let content = self.responses.lock().unwrap().pop().ok_or_else(|| {
            ClientError::MalformedResponse {
                detail: "scripted client exhausted".to_string(),
            }
        })?;

        Ok(ModelResponse {
            content,
            model: self.model.clone(),
            usage: TokenUsage::default(),
            finish_reason: "stop".to_string(),
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
