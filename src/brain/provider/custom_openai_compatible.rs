//! Custom OpenAI-Compatible Provider Implementation
//!
//! Implements the Provider trait for any endpoint that speaks the OpenAI chat
//! completions protocol:
//! - Official OpenAI
//! - OpenRouter and other hosted gateways
//! - Local LLMs via LM Studio, Ollama, vLLM
//!
//! The provider is built from an explicit [`JudgeConfig`], so tests can point
//! it at a fake endpoint with fake credentials.

use super::error::{ProviderError, Result};
use super::r#trait::Provider;
use super::types::*;
use crate::config::{JudgeConfig, SecretString};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Client for an OpenAI-compatible chat completions endpoint
#[derive(Clone)]
pub struct OpenAIProvider {
    api_key: Option<SecretString>,
    base_url: String,
    timeout: Duration,
    client: Client,
    name: String,
}

impl OpenAIProvider {
    /// Create a provider for `base_url` with a whole-request `timeout`.
    ///
    /// A missing key is logged but accepted; requests fail with
    /// [`ProviderError::Auth`] until one is configured.
    pub fn new(
        api_key: Option<SecretString>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(timeout))
            .pool_idle_timeout(DEFAULT_POOL_IDLE_TIMEOUT)
            .pool_max_idle_per_host(8)
            .build()
            .map_err(ProviderError::Http)?;

        if api_key.as_ref().is_none_or(|k| k.is_empty()) {
            tracing::warn!(
                "No API key configured (set OPENAI_API_KEY or judge.api_key); verdict requests will fail"
            );
        }

        Ok(Self {
            api_key,
            base_url: base_url.into(),
            timeout,
            client,
            name: "openai".to_string(),
        })
    }

    /// Create a provider from the judge section of the configuration.
    pub fn from_config(config: &JudgeConfig) -> Result<Self> {
        let provider = Self::new(
            config.api_key.clone(),
            config.base_url.clone(),
            config.timeout(),
        )?;

        if config.base_url.contains("api.openai.com") {
            Ok(provider)
        } else {
            Ok(provider.with_name("openai-compatible"))
        }
    }

    /// Set provider name (for logging)
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build request headers. Fails before any network traffic when the key is
    /// missing or cannot be sent.
    fn headers(&self) -> Result<HeaderMap> {
        let key = self
            .api_key
            .as_ref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ProviderError::Auth("no API key configured".to_string()))?;

        let header_value = HeaderValue::from_str(&format!("Bearer {}", key.expose_secret()))
            .map_err(|_| {
                tracing::error!(
                    "API key contains invalid characters (length={}). Check the judge configuration.",
                    key.len()
                );
                ProviderError::Auth("API key contains invalid header characters".to_string())
            })?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, header_value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Convert our generic request to OpenAI-specific format
    fn to_openai_request(&self, request: CompletionRequest) -> OpenAIRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(system) = request.system {
            messages.push(OpenAIMessage {
                role: Role::System.as_str().to_string(),
                content: Some(system),
            });
        }

        messages.extend(request.messages.into_iter().map(|msg| OpenAIMessage {
            role: msg.role.as_str().to_string(),
            content: Some(msg.content),
        }));

        OpenAIRequest {
            model: request.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        }
    }

    /// Classify a transport failure. Deadline expiry becomes [`ProviderError::Timeout`].
    fn map_transport(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::Http(error)
        }
    }

    /// Handle API error response
    async fn handle_error(&self, response: reqwest::Response) -> ProviderError {
        let status = response.status().as_u16();

        // Retry-After may also be an HTTP date; only the seconds form is reported
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return self.map_transport(e),
        };

        let provider_message = serde_json::from_str::<OpenAIErrorResponse>(&body)
            .ok()
            .map(|e| e.error.message);

        match status {
            401 | 403 => ProviderError::Auth(
                provider_message
                    .unwrap_or_else(|| format!("provider rejected credentials (HTTP {status})")),
            ),
            429 => {
                let base = provider_message.unwrap_or_else(|| "Rate limit exceeded".to_string());
                let message = match retry_after {
                    Some(secs) => format!("{} (retry after {} seconds)", base, secs),
                    None => format!("{} (rate limited, please retry later)", base),
                };
                ProviderError::Api { status, message }
            }
            _ => ProviderError::Api {
                status,
                message: provider_message.unwrap_or_else(|| "Unknown error".to_string()),
            },
        }
    }

    async fn send(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let headers = self.headers()?;
        let openai_request = self.to_openai_request(request);

        tracing::info!(
            "{} request: model={}, messages={}, max_tokens={}, temperature={}",
            self.name,
            openai_request.model,
            openai_request.messages.len(),
            openai_request.max_tokens,
            openai_request.temperature
        );
        tracing::debug!("Sending request to {}", self.base_url);

        let response = self
            .client
            .post(&self.base_url)
            .headers(headers)
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        tracing::debug!("{} response status: {}", self.name, status);

        if !status.is_success() {
            return Err(self.handle_error(response).await);
        }

        let body = response.text().await.map_err(|e| self.map_transport(e))?;
        let completion = parse_completion(body)?;

        if completion.finish_reason.as_deref() == Some("length") {
            tracing::warn!(
                "{} completion hit max_tokens={}; output may be truncated",
                self.name,
                openai_request.max_tokens
            );
        }

        tracing::info!(
            "{} response: input_tokens={}, output_tokens={}, finish_reason={:?}",
            self.name,
            completion.usage.input_tokens,
            completion.usage.output_tokens,
            completion.finish_reason
        );

        Ok(completion)
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let result = self.send(request).await;

        if let Err(ref e) = result {
            tracing::error!("{} API request failed: {}", self.name, e);
        }

        result
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Decode a successful chat completion body into the first choice's text.
fn parse_completion(body: String) -> Result<CompletionResponse> {
    let response: OpenAIResponse = match serde_json::from_str(&body) {
        Ok(response) => response,
        Err(e) => {
            return Err(ProviderError::Malformed {
                message: e.to_string(),
                raw: body,
            });
        }
    };

    let Some(choice) = response.choices.into_iter().next() else {
        return Err(ProviderError::EmptyResponse { raw: body });
    };

    let text = match choice.message.content {
        Some(content) if !content.trim().is_empty() => content,
        _ => return Err(ProviderError::EmptyResponse { raw: body }),
    };

    let usage = response.usage.unwrap_or_default();

    Ok(CompletionResponse {
        id: response.id,
        model: response.model,
        text,
        finish_reason: choice.finish_reason,
        usage: TokenUsage {
            input_tokens: usage.prompt_tokens.unwrap_or(0),
            output_tokens: usage.completion_tokens.unwrap_or(0),
        },
    })
}

// ============================================================================
// OpenAI API Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIError {
    message: String,
}
