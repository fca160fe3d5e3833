//! Provider trait

use super::error::Result;
use super::types::{CompletionRequest, CompletionResponse};
use async_trait::async_trait;

/// A chat-completion backend.
///
/// One call to [`Provider::complete`] is one outbound request. Implementations
/// hold no per-request state and are shared across concurrent callers.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send a completion request and return the raw text the model produced.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Provider name, for logging
    fn name(&self) -> &str;
}
