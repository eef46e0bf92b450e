use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    ChatRequest, ChatResponse, ModelInfo, Provider, ProviderError, ProviderFactory, Role, Usage,
};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const FALLBACK_MAX_TOKENS: u64 = 4096;

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub base_url: Option<String>,
}

#[derive(Debug)]
pub struct AnthropicProvider {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_config(AnthropicConfig {
            api_key: api_key.into(),
            base_url: None,
        })
    }

    pub fn with_config(config: AnthropicConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn known_models() -> Vec<ModelInfo> {
        [
            ("claude-sonnet-4-20250514", "Claude Sonnet 4", 16000),
            ("claude-3-5-sonnet-20241022", "Claude 3.5 Sonnet", 8192),
            ("claude-3-5-haiku-20241022", "Claude 3.5 Haiku", 8192),
            ("claude-3-opus-20240229", "Claude 3 Opus", 4096),
        ]
        .into_iter()
        .map(|(id, name, max_output_tokens)| ModelInfo {
            id: id.to_string(),
            name: name.to_string(),
            provider: "anthropic".to_string(),
            context_window: 200000,
            max_output_tokens,
        })
        .collect()
    }

    fn endpoint(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(ANTHROPIC_API_URL)
    }
}

fn convert_request(request: ChatRequest) -> AnthropicRequest {
    let messages = request
        .messages
        .into_iter()
        .map(|msg| AnthropicMessage {
            role: match msg.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: msg.content,
        })
        .collect();

    AnthropicRequest {
        model: request.model,
        max_tokens: request.max_tokens.unwrap_or(FALLBACK_MAX_TOKENS),
        messages,
        system: request.system,
    }
}

fn convert_response(response: AnthropicResponse) -> ChatResponse {
    let text = response
        .content
        .iter()
        .filter_map(|c| c.text.clone())
        .collect::<Vec<_>>()
        .join("");

    ChatResponse {
        id: response.id,
        model: response.model,
        text,
        usage: response.usage.map(|usage| Usage {
            prompt_tokens: usage.input_tokens,
            completion_tokens: usage.output_tokens,
            total_tokens: usage.input_tokens + usage.output_tokens,
        }),
    }
}

/// Pulls `error.message` out of an Anthropic error body, else returns the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<AnthropicErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.to_string())
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn id(&self) -> &str {
        "anthropic"
    }

    fn name(&self) -> &str {
        "Anthropic"
    }

    fn models(&self) -> Vec<ModelInfo> {
        Self::known_models()
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let anthropic_request = convert_request(request);
        tracing::debug!(
            model = %anthropic_request.model,
            messages = anthropic_request.messages.len(),
            max_tokens = anthropic_request.max_tokens,
            "sending anthropic request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&anthropic_request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "anthropic request failed");
            return Err(ProviderError::from_status(
                status.as_u16(),
                error_message(&body),
            ));
        }

        let anthropic_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        if anthropic_response.content.iter().all(|c| c.text.is_none()) {
            return Err(ProviderError::InvalidResponse(
                "response contained no text content".to_string(),
            ));
        }

        Ok(convert_response(anthropic_response))
    }
}

/// Builds an [`AnthropicProvider`] per request.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnthropicFactory;

impl ProviderFactory for AnthropicFactory {
    fn create(&self, api_key: &str, base_url: Option<&str>) -> Arc<dyn Provider> {
        Arc::new(AnthropicProvider::with_config(AnthropicConfig {
            api_key: api_key.to_string(),
            base_url: base_url.map(str::to_string),
        }))
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u64,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    content: Vec<AnthropicResponseContent>,
    usage: Option<AnthropicResponseUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponseContent {
    #[serde(rename = "type")]
    _content_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponseUsage {
    input_tokens: u64,
    output_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    error: AnthropicErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Message;

    #[test]
    fn test_convert_request_wire_shape() {
        let request = ChatRequest::new(
            "claude-3-opus-20240229",
            vec![Message::user("hi"), Message::assistant("hello"), Message::user("again")],
        )
        .with_system("be brief")
        .with_max_tokens(4000);

        let wire = serde_json::to_value(convert_request(request)).unwrap();
        assert_eq!(
            wire,
            serde_json::json!({
                "model": "claude-3-opus-20240229",
                "max_tokens": 4000,
                "system": "be brief",
                "messages": [
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "hello"},
                    {"role": "user", "content": "again"}
                ]
            })
        );
    }

    #[test]
    fn test_convert_request_defaults_max_tokens() {
        let request = ChatRequest::new("m", vec![Message::user("x")]);
        assert_eq!(convert_request(request).max_tokens, FALLBACK_MAX_TOKENS);
    }

    #[test]
    fn test_convert_response_joins_text_blocks() {
        let raw = r#"{
            "id": "msg_1",
            "model": "claude-3-opus-20240229",
            "content": [{"type": "text", "text": "Hello "}, {"type": "text", "text": "world"}],
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }"#;
        let parsed: AnthropicResponse = serde_json::from_str(raw).unwrap();
        let response = convert_response(parsed);
        assert_eq!(response.text, "Hello world");
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_error_message_prefers_api_message() {
        let body = r#"{"type":"error","error":{"type":"not_found_error","message":"model: claude-x"}}"#;
        assert_eq!(error_message(body), "model: claude-x");
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
    }

    #[test]
    fn test_factory_builds_anthropic() {
        let provider = AnthropicFactory.create("key", Some("http://localhost:1/v1/messages"));
        assert_eq!(provider.id(), "anthropic");
        assert!(provider
            .models()
            .iter()
            .any(|m| m.id == "claude-3-opus-20240229"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let provider = AnthropicProvider::with_config(AnthropicConfig {
            api_key: "key".into(),
            base_url: Some("http://127.0.0.1:9/v1/messages".into()),
        });
        let err = provider
            .chat(ChatRequest::new("m", vec![Message::user("x")]))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NetworkError(_)));
    }
}
