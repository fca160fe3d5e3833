//! Prompt composition for the judge.
//!
//! Builds the system instruction (persona plus the JSON output contract) and
//! the user message for one dispute. Composition is pure: the same request
//! always produces the same prompt.

use super::error::{Result, VerdictError};
use super::types::VerdictRequest;
use crate::brain::provider::{CompletionRequest, Message};

/// Context used when the caller supplies none.
pub const CONTEXT_PLACEHOLDER: &str = "No additional context provided.";

/// Default per-field character cap.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 2000;

/// Persona and output contract sent as the system message.
pub const SYSTEM_PROMPT: &str = "\
You are WhoIsWrong, a blunt but fair judge of everyday disputes. \
You will be given the context of a disagreement and two options, Option A and Option B. \
Decide which option is wrong. You must always pick exactly one: \
never declare a tie, never say both or neither are wrong, and never refuse.

Respond with a single JSON object and nothing else. No markdown, no code fences, no commentary. \
Use exactly these keys:
{\"wrong\": \"<the option that is wrong>\", \"right\": \"<the other option>\", \"reason\": \"<one or two short sentences explaining the verdict>\"}

The values of \"wrong\" and \"right\" must be copied verbatim from Option A and Option B.";

/// The two messages sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub system: String,
    pub user: String,
}

impl ComposedPrompt {
    /// Wrap the prompt in a completion request with fixed sampling parameters.
    pub fn into_completion_request(
        self,
        model: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> CompletionRequest {
        CompletionRequest {
            model: model.to_string(),
            system: Some(self.system),
            messages: vec![Message::user(self.user)],
            temperature,
            max_tokens,
        }
    }
}

/// Compose the prompt with the default input cap.
pub fn compose(request: &VerdictRequest) -> Result<ComposedPrompt> {
    compose_with_limit(request, DEFAULT_MAX_INPUT_CHARS)
}

/// Compose the prompt, rejecting fields longer than `max_chars` characters.
pub fn compose_with_limit(request: &VerdictRequest, max_chars: usize) -> Result<ComposedPrompt> {
    let option_a = required_field("optionA", &request.option_a, max_chars)?;
    let option_b = required_field("optionB", &request.option_b, max_chars)?;

    if option_a.eq_ignore_ascii_case(option_b) {
        return Err(VerdictError::validation(
            "optionA and optionB must be different",
        ));
    }

    let context = match request.context.as_deref().map(str::trim) {
        Some(context) if !context.is_empty() => {
            check_length("context", context, max_chars)?;
            context
        }
        _ => CONTEXT_PLACEHOLDER,
    };

    let user = format!(
        "Context: {context}\n\nOption A: {option_a}\nOption B: {option_b}\n\nWho is wrong?"
    );

    Ok(ComposedPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    })
}

fn required_field<'a>(name: &str, value: &'a str, max_chars: usize) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(VerdictError::validation(format!("{name} is required")));
    }
    check_length(name, value, max_chars)?;
    Ok(value)
}

fn check_length(name: &str, value: &str, max_chars: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max_chars {
        return Err(VerdictError::validation(format!(
            "{name} is too long ({len} characters, limit {max_chars})"
        )));
    }
    Ok(())
}
