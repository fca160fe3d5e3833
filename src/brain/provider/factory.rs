//! Provider Factory
//!
//! Builds the completion provider from configuration.

use super::{OpenAIProvider, Provider};
use crate::config::JudgeConfig;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Create the provider described by the judge configuration.
///
/// Every backend the judge talks to speaks the OpenAI chat completions
/// protocol; the base URL decides whether that is OpenAI itself, a hosted
/// gateway, or a local server.
pub fn create_provider(config: &JudgeConfig) -> Result<Arc<dyn Provider>> {
    let provider = OpenAIProvider::from_config(config)
        .context("Failed to build HTTP client for the completion provider")?;

    tracing::info!(
        "Using provider: {} at {} (model={})",
        provider.name(),
        provider.base_url(),
        config.model
    );

    Ok(Arc::new(provider))
}
