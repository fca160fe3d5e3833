//! Judge service: the compose → invoke → parse pipeline.

use super::error::Result;
use super::parser::parse_verdict;
use super::prompt::compose_with_limit;
use super::types::{VerdictRequest, VerdictResult};
use crate::brain::provider::Provider;
use crate::config::JudgeConfig;
use std::sync::Arc;
use std::time::Instant;

/// Produces verdicts by calling the configured provider.
///
/// Holds no mutable state; share it behind an `Arc` across requests.
#[derive(Clone)]
pub struct JudgeService {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_input_chars: usize,
}

impl JudgeService {
    pub fn new(provider: Arc<dyn Provider>, config: &JudgeConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_input_chars: config.max_input_chars,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Judge one dispute.
    ///
    /// Invalid input fails before the provider is called. Provider and parse
    /// failures are returned unchanged; nothing is retried.
    pub async fn verdict(&self, request: &VerdictRequest) -> Result<VerdictResult> {
        let prompt = compose_with_limit(request, self.max_input_chars)?;
        let completion_request =
            prompt.into_completion_request(&self.model, self.temperature, self.max_tokens);

        let started = Instant::now();
        let completion = self.provider.complete(completion_request).await?;
        tracing::debug!(
            "Completion {} from {} received in {}ms",
            completion.id,
            self.provider.name(),
            started.elapsed().as_millis()
        );

        let verdict = parse_verdict(&completion.text)?
            .reconcile(&request.option_a, &request.option_b)?;

        tracing::info!(
            "Verdict produced: model={}, output_tokens={}, elapsed={}ms",
            self.model,
            completion.usage.output_tokens,
            started.elapsed().as_millis()
        );

        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::provider::{ProviderError, Role};
    use crate::brain::test_helpers::{MockProvider, Reply};
    use crate::brain::verdict::VerdictError;

    fn service(provider: Arc<MockProvider>) -> JudgeService {
        JudgeService::new(provider, &JudgeConfig::default())
    }

    fn dishes() -> VerdictRequest {
        VerdictRequest::new(Some(String::new()), "left the dishes", "ignored a text")
    }

    #[tokio::test]
    async fn test_end_to_end_verdict() {
        let provider = MockProvider::new(Reply::Text(
            r#"{"wrong":"left the dishes","right":"ignored a text","reason":"dishes pile up and annoy roommates"}"#,
        ));
        let judge = service(provider.clone());

        let verdict = judge.verdict(&dishes()).await.unwrap();
        assert_eq!(
            verdict,
            VerdictResult {
                wrong: "left the dishes".to_string(),
                right: "ignored a text".to_string(),
                reason: "dishes pile up and annoy roommates".to_string(),
            }
        );
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_request_carries_fixed_sampling_parameters() {
        let provider = MockProvider::new(Reply::Text(
            r#"{"wrong":"ignored a text","right":"left the dishes","reason":"be kind"}"#,
        ));
        let judge = service(provider.clone());
        judge.verdict(&dishes()).await.unwrap();

        let requests = provider.requests.lock().unwrap();
        let sent = &requests[0];
        let defaults = JudgeConfig::default();
        assert_eq!(sent.model, defaults.model);
        assert_eq!(sent.max_tokens, defaults.max_tokens);
        assert!((sent.temperature - defaults.temperature).abs() < f32::EPSILON);
        assert!(sent.system.as_deref().unwrap().contains("\"wrong\""));
        assert_eq!(sent.messages.len(), 1);
        assert_eq!(sent.messages[0].role, Role::User);
        assert!(sent.messages[0].content.contains("Option A: left the dishes"));
    }

    #[tokio::test]
    async fn test_validation_happens_before_any_call() {
        let provider = MockProvider::new(Reply::Text("{}"));
        let judge = service(provider.clone());

        let err = judge
            .verdict(&VerdictRequest::new(None, "", "ignored a text"))
            .await
            .unwrap_err();
        assert!(matches!(err, VerdictError::Validation(_)));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_upstream_errors_pass_through() {
        let judge = service(MockProvider::new(Reply::Timeout));
        let err = judge.verdict(&dishes()).await.unwrap_err();
        assert!(matches!(
            err,
            VerdictError::Upstream(ProviderError::Timeout(_))
        ));

        let judge = service(MockProvider::new(Reply::Empty));
        let err = judge.verdict(&dishes()).await.unwrap_err();
        assert_eq!(err.code(), "upstream_empty_response");
        assert_eq!(err.raw().as_deref(), Some(r#"{"choices":[]}"#));
    }

    #[tokio::test]
    async fn test_wrapped_output_is_recovered() {
        let judge = service(MockProvider::new(Reply::Text(
            "Sure! {\"wrong\":\"ignored a text\",\"right\":\"left the dishes\",\"reason\":\"reply to your friends\"} Hope that helps.",
        )));
        let verdict = judge.verdict(&dishes()).await.unwrap();
        assert_eq!(verdict.wrong, "ignored a text");
        assert_eq!(verdict.right, "left the dishes");
    }

    #[tokio::test]
    async fn test_prose_fails_without_fabricating_a_verdict() {
        let judge = service(MockProvider::new(Reply::Text(
            "Honestly, both of you could do better.",
        )));
        let err = judge.verdict(&dishes()).await.unwrap_err();
        assert_eq!(err.code(), "parse_error");
        assert_eq!(
            err.raw().as_deref(),
            Some("Honestly, both of you could do better.")
        );
    }

    #[tokio::test]
    async fn test_neutral_verdict_is_rejected() {
        let judge = service(MockProvider::new(Reply::Text(
            r#"{"wrong":"both","right":"neither","reason":"it's a tie"}"#,
        )));
        let err = judge.verdict(&dishes()).await.unwrap_err();
        assert_eq!(err.code(), "parse_error");
    }
}
