//! LLM Provider Abstraction Layer
//!
//! The model invoker: sends composed messages to a chat-completion endpoint
//! and hands back the raw completion text.

pub mod error;
#[allow(clippy::module_inception)]
mod r#trait;
pub mod types;

// Re-exports
pub use error::{ProviderError, Result};
pub use r#trait::Provider;
pub use types::*;

// Provider implementations
pub mod custom_openai_compatible;
pub mod factory;

pub use custom_openai_compatible::OpenAIProvider;
pub use factory::create_provider;
