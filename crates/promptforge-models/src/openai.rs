//! OpenAI-compatible model implementation.
//!
//! This module provides an implementation of the `Model` trait for any server
//! that implements the OpenAI Chat Completions API. The base URL is
//! configurable, so the same client serves both OpenAI proper and
//! OpenAI-compatible hosts such as Novita.

use async_trait::async_trait;
use promptforge_abstraction::{
    ChatMessage, Model, ModelError, ModelParameters, ModelResponse, ModelUsage,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// Outbound calls are attempted exactly once with this bound; there is no
/// retry policy anywhere in the pipeline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// OpenAI-compatible chat completion client.
#[derive(Debug, Clone)]
pub struct OpenAiCompatModel {
    /// The model identifier (e.g., "gpt-4", "meta-llama/llama-3.1-8b-instruct").
    model_id: String,
    /// Base URL for the API endpoint (e.g., "https://api.openai.com/v1").
    base_url: String,
    /// The API key for authentication.
    api_key: String,
    /// HTTP client for making requests.
    client: Client,
}

impl OpenAiCompatModel {
    /// Creates a new `OpenAiCompatModel` with an explicit API key and base URL.
    ///
    /// No network I/O happens here; the first request is sent on the first
    /// chat completion call.
    #[must_use]
    pub fn new(model_id: String, base_url: String, api_key: String) -> Self {
        Self {
            model_id,
            base_url,
            api_key,
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }
}

#[async_trait]
impl Model for OpenAiCompatModel {
    async fn generate_chat_completion(
        &self,
        messages: &[ChatMessage],
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        debug!(
            model_id = %self.model_id,
            message_count = messages.len(),
            parameters = ?parameters,
            "OpenAiCompatModel generating chat completion"
        );

        let url = format!("{}/chat/completions", self.base_url);

        let openai_messages: Vec<OpenAiMessage> = messages
            .iter()
            .map(|msg| OpenAiMessage { role: msg.role.clone(), content: msg.content.clone() })
            .collect();

        let mut request_body = OpenAiRequest {
            model: self.model_id.clone(),
            messages: openai_messages,
            temperature: None,
            top_p: None,
            max_tokens: None,
            stop: None,
        };

        if let Some(params) = parameters {
            request_body.temperature = params.temperature;
            request_body.top_p = params.top_p;
            request_body.max_tokens = params.max_tokens;
            request_body.stop = params.stop_sequences;
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, url = %url, "Failed to send request to OpenAI-compatible API");
                ModelError::RequestError(format!("Network error: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                status = %status,
                error = %error_text,
                "OpenAI-compatible API returned error status"
            );
            return Err(ModelError::ModelResponseError(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let api_response: OpenAiResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse OpenAI-compatible API response");
            ModelError::SerializationError(format!("Failed to parse response: {}", e))
        })?;

        let content =
            api_response.choices.into_iter().next().map(|c| c.message.content).ok_or_else(
                || {
                    error!("No content in API response");
                    ModelError::ModelResponseError("No content in API response".to_string())
                },
            )?;

        let usage = api_response.usage.map(|u| ModelUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ModelResponse { content, model_id: Some(self.model_id.clone()), usage })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// OpenAI API request/response structures

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)] // Matches API naming
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_creation() {
        let model = OpenAiCompatModel::new(
            "gpt-4".to_string(),
            "https://api.openai.com/v1".to_string(),
            "test-key".to_string(),
        );
        assert_eq!(model.model_id(), "gpt-4");
    }

    #[test]
    fn test_request_body_skips_absent_parameters() {
        let body = OpenAiRequest {
            model: "gpt-4".to_string(),
            messages: vec![],
            temperature: Some(0.3),
            top_p: None,
            max_tokens: Some(1000),
            stop: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"temperature\":0.3"));
        assert!(json.contains("\"max_tokens\":1000"));
        assert!(!json.contains("top_p"));
        assert!(!json.contains("stop"));
    }
}
