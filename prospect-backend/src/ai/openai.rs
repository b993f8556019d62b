use crate::ai::{CompletionBackend, CompletionRequest, Message, ProviderError};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    endpoint: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct OpenAICompletionRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAICompletionResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}

impl OpenAIClient {
    pub fn new(api_key: &str, model: &str) -> Result<Self, String> {
        Self::new_with_endpoint(api_key, model, None)
    }

    pub fn new_with_endpoint(
        api_key: &str,
        model: &str,
        endpoint: Option<&str>,
    ) -> Result<Self, String> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        if !api_key.is_empty() {
            let auth_value = header::HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| format!("Invalid API key format: {}", e))?;
            headers.insert(header::AUTHORIZATION, auth_value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            endpoint: endpoint.unwrap_or(DEFAULT_ENDPOINT).to_string(),
            model: model.to_string(),
        })
    }

    pub async fn generate_text(&self, messages: Vec<Message>) -> Result<String, ProviderError> {
        self.send(messages, 1024, None, false).await
    }

    async fn send(
        &self,
        messages: Vec<Message>,
        max_tokens: u32,
        temperature: Option<f32>,
        json_object: bool,
    ) -> Result<String, ProviderError> {
        let api_messages: Vec<OpenAIMessage> = messages
            .into_iter()
            .map(|m| OpenAIMessage {
                role: m.role.to_string(),
                content: m.content,
            })
            .collect();

        let request = OpenAICompletionRequest {
            model: self.model.clone(),
            messages: api_messages,
            max_tokens,
            temperature,
            response_format: json_object.then(|| json!({"type": "json_object"})),
        };

        log::debug!(
            "[OPENAI] Sending request to {} with model {} (json_object: {})",
            self.endpoint,
            self.model,
            json_object
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("OpenAI API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(error_response) = serde_json::from_str::<OpenAIErrorResponse>(&error_text) {
                return Err(ProviderError::Api(format!(
                    "OpenAI API error: {}",
                    error_response.error.message
                )));
            }

            return Err(ProviderError::Api(format!(
                "OpenAI API returned error status: {}, body: {}",
                status, error_text
            )));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(format!("Failed to read OpenAI response: {}", e)))?;

        let response_data: OpenAICompletionResponse = serde_json::from_str(&response_text)
            .map_err(|e| {
                ProviderError::Malformed(format!(
                    "Failed to parse OpenAI response: {} - body: {}",
                    e, response_text
                ))
            })?;

        let choice = response_data
            .choices
            .first()
            .ok_or_else(|| ProviderError::Malformed("OpenAI API returned no choices".to_string()))?;

        Ok(choice.message.content.clone().unwrap_or_default())
    }
}

#[async_trait]
impl CompletionBackend for OpenAIClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let messages = vec![Message::user(request.prompt)];
        self.send(
            messages,
            request.max_tokens,
            request.temperature,
            request.json_object,
        )
        .await
    }
}
