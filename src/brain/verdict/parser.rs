//! Tolerant parsing of model output into a verdict.
//!
//! Models do not reliably return clean JSON. The text is run through an
//! ordered chain of recovery stages, each more permissive than the last, and
//! the first stage that yields a JSON object wins:
//!
//! 1. [`ParseStage::Direct`]: the trimmed text as-is
//! 2. [`ParseStage::BraceExtract`]: the span from the first `{` to the last `}`
//! 3. [`ParseStage::QuoteNormalized`]: that span with newlines collapsed and
//!    single-quote string delimiters rewritten as double quotes
//!
//! The chain runs once and never loops. The recovered object must then carry
//! non-empty `wrong`, `right` and `reason` strings.

use super::error::{Result, VerdictError};
use super::types::VerdictResult;
use crate::utils::truncate_str;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;

/// Fields every verdict object must carry.
pub const REQUIRED_FIELDS: [&str; 3] = ["wrong", "right", "reason"];

const RAW_PREVIEW_CHARS: usize = 200;

static NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n|\r|\n").expect("valid regex"));

/// The recovery stage that produced the JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    Direct,
    BraceExtract,
    QuoteNormalized,
}

impl fmt::Display for ParseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParseStage::Direct => "direct",
            ParseStage::BraceExtract => "brace_extract",
            ParseStage::QuoteNormalized => "quote_normalized",
        };
        f.write_str(name)
    }
}

type JsonObject = Map<String, Value>;
type StageFn = fn(&str) -> std::result::Result<JsonObject, String>;

/// Recovery stages in the order they are attempted.
const STAGES: [(ParseStage, StageFn); 3] = [
    (ParseStage::Direct, parse_direct),
    (ParseStage::BraceExtract, parse_brace_span),
    (ParseStage::QuoteNormalized, parse_normalized_span),
];

/// Recover a JSON object from raw model text.
///
/// Fails with [`VerdictError::Parse`] carrying `raw` when no stage succeeds.
pub fn extract_json(raw: &str) -> Result<(JsonObject, ParseStage)> {
    let mut failures = Vec::with_capacity(STAGES.len());

    for (stage, attempt) in STAGES {
        match attempt(raw) {
            Ok(object) => {
                if stage != ParseStage::Direct {
                    tracing::debug!("Recovered verdict JSON via {} stage", stage);
                }
                return Ok((object, stage));
            }
            Err(reason) => {
                tracing::trace!("Parse stage {} failed: {}", stage, reason);
                failures.push(format!("{stage}: {reason}"));
            }
        }
    }

    tracing::warn!(
        "Model response is not recoverable JSON ({}); raw preview: {:?}",
        failures.join("; "),
        truncate_str(raw, RAW_PREVIEW_CHARS)
    );

    Err(VerdictError::unparseable(
        "model response is not valid JSON",
        raw,
    ))
}

/// Parse raw model text into a validated (not yet reconciled) verdict.
pub fn parse_verdict(raw: &str) -> Result<VerdictResult> {
    let (object, _stage) = extract_json(raw)?;
    validate_fields(object)
}

/// Require non-empty string `wrong`, `right` and `reason` fields.
fn validate_fields(object: JsonObject) -> Result<VerdictResult> {
    let field = |name: &str| {
        object
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    match (field("wrong"), field("right"), field("reason")) {
        (Some(wrong), Some(right), Some(reason)) => Ok(VerdictResult {
            wrong,
            right,
            reason,
        }),
        _ => {
            let missing: Vec<&str> = REQUIRED_FIELDS
                .into_iter()
                .filter(|&name| field(name).is_none())
                .collect();
            tracing::warn!(
                "Model response is missing required field(s): {}",
                missing.join(", ")
            );
            Err(VerdictError::incomplete(
                format!("missing or empty field(s): {}", missing.join(", ")),
                Value::Object(object),
            ))
        }
    }
}

fn parse_object(text: &str) -> std::result::Result<JsonObject, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(other) => Err(format!("expected a JSON object, found {}", json_kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn parse_direct(raw: &str) -> std::result::Result<JsonObject, String> {
    parse_object(raw.trim())
}

/// The text from the first `{` through the last `}`, if both exist in order.
fn brace_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

fn parse_brace_span(raw: &str) -> std::result::Result<JsonObject, String> {
    let span = brace_span(raw).ok_or_else(|| "no {...} span in text".to_string())?;
    parse_object(span)
}

fn parse_normalized_span(raw: &str) -> std::result::Result<JsonObject, String> {
    let span = brace_span(raw).ok_or_else(|| "no {...} span in text".to_string())?;
    let collapsed = NEWLINES.replace_all(span, " ");
    parse_object(&normalize_quotes(&collapsed))
}

/// Rewrite single-quoted JSON strings as double-quoted ones.
///
/// Only quotes acting as string delimiters are rewritten. A `'` inside a
/// single-quoted string closes it only when the next non-space character is
/// `:`, `,`, `}`, `]` or the end of input, so apostrophes in values such as
/// `'that's rough'` are kept. Double-quoted strings pass through untouched.
pub fn normalize_quotes(text: &str) -> String {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum State {
        Outside,
        InDouble,
        InSingle,
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 8);
    let mut state = State::Outside;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match state {
            State::Outside => match c {
                '"' => {
                    state = State::InDouble;
                    out.push('"');
                }
                '\'' => {
                    state = State::InSingle;
                    out.push('"');
                }
                _ => out.push(c),
            },
            State::InDouble => {
                out.push(c);
                if c == '\\' {
                    if let Some(&next) = chars.get(i + 1) {
                        out.push(next);
                        i += 1;
                    }
                } else if c == '"' {
                    state = State::Outside;
                }
            }
            State::InSingle => match c {
                '\\' => match chars.get(i + 1) {
                    Some('\'') => {
                        out.push('\'');
                        i += 1;
                    }
                    Some(&next) => {
                        out.push('\\');
                        out.push(next);
                        i += 1;
                    }
                    None => out.push('\\'),
                },
                '\'' if closes_string(&chars[i + 1..]) => {
                    state = State::Outside;
                    out.push('"');
                }
                '"' => out.push_str("\\\""),
                _ => out.push(c),
            },
        }
        i += 1;
    }

    out
}

fn closes_string(rest: &[char]) -> bool {
    match rest.iter().find(|c| !c.is_whitespace()) {
        None => true,
        Some(c) => matches!(c, ':' | ',' | '}' | ']'),
    }
}
