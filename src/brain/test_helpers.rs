//! Shared test doubles for the judge pipeline.

use crate::brain::provider::{
    CompletionRequest, CompletionResponse, Provider, ProviderError, Result, TokenUsage,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the mock provider answers with.
pub enum Reply {
    Text(&'static str),
    Timeout,
    Empty,
    Auth,
}

/// Mock provider: replays a fixed reply and records every request
pub struct MockProvider {
    reply: Reply,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl MockProvider {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.requests.lock().unwrap().push(request);
        match self.reply {
            Reply::Text(text) => Ok(CompletionResponse {
                id: "mock-1".to_string(),
                model: "mock-model".to_string(),
                text: text.to_string(),
                finish_reason: Some("stop".to_string()),
                usage: TokenUsage {
                    input_tokens: 100,
                    output_tokens: 25,
                },
            }),
            Reply::Timeout => Err(ProviderError::Timeout(Duration::from_secs(30))),
            Reply::Empty => Err(ProviderError::EmptyResponse {
                raw: r#"{"choices":[]}"#.to_string(),
            }),
            Reply::Auth => Err(ProviderError::Auth("invalid api key".to_string())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
