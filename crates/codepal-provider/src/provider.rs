use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{ChatRequest, ChatResponse};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub context_window: u64,
    pub max_output_tokens: u64,
}

/// A hosted generative model API.
#[async_trait]
pub trait Provider: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;

    fn models(&self) -> Vec<ModelInfo>;

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError>;
}

/// Builds a provider for one request from the key configured at that moment.
pub trait ProviderFactory: Send + Sync {
    fn create(&self, api_key: &str, base_url: Option<&str>) -> Arc<dyn Provider>;
}

impl<F> ProviderFactory for F
where
    F: Fn(&str, Option<&str>) -> Arc<dyn Provider> + Send + Sync,
{
    fn create(&self, api_key: &str, base_url: Option<&str>) -> Arc<dyn Provider> {
        self(api_key, base_url)
    }
}

/// Provider failures. `Display` is the text shown to the user verbatim.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API error (status {status_code}): {message}")]
    ApiErrorWithStatus { message: String, status_code: u16 },

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Maps an HTTP failure to the most specific variant.
    pub fn from_status(status_code: u16, body: impl Into<String>) -> Self {
        let message = body.into();
        match status_code {
            401 | 403 => ProviderError::AuthError(message),
            404 => ProviderError::ModelNotFound(message),
            429 => ProviderError::RateLimit(message),
            _ => ProviderError::ApiErrorWithStatus {
                message,
                status_code,
            },
        }
    }
}
