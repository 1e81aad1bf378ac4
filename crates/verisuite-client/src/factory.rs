//! Provider selection by model-name prefix.

use crate::client::ModelClient;
use crate::error::ClientResult;
use crate::gemini::GeminiClient;
use crate::openai::OpenAiClient;

/// Build the client for a model based on its name.
///
/// `gemini-*` selects the Gemini client; `gpt-*`, `o1-*`, and anything else
/// falls through to the OpenAI-compatible client.
pub fn client_for_model(model: &str) -> ClientResult<Box<dyn ModelClient>> {
    if model.starts_with("gemini-") {
        Ok(Box::new(GeminiClient::new(model)?))
    } else {
        Ok(Box::new(OpenAiClient::new(model)?))
    }
}
