//! verisuite-client: model-invocation clients for the Verisuite harness.
//!
//! Defines the [`ModelClient`] contract plus HTTP implementations for
//! OpenAI-compatible and Gemini endpoints, a prefix-based factory, and a
//! scripted fake for tests.

pub mod client;
pub mod error;
pub mod factory;
pub mod fakes;
pub mod gemini;
pub mod openai;

pub use client::{ModelClient, ModelRequest, ModelResponse, TokenUsage};
pub use error::{ClientError, ClientResult};
pub use factory::client_for_model;
pub use fakes::ScriptedClient;
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
