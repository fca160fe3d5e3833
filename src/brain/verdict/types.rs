//! Verdict request and result types

use super::error::{Result, VerdictError};
use serde::{Deserialize, Serialize};

/// A dispute submitted for judgement.
///
/// Missing option fields deserialize as empty strings so the composer, not the
/// transport, rejects them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default)]
    pub option_a: String,
    #[serde(default)]
    pub option_b: String,
}

impl VerdictRequest {
    pub fn new(
        context: Option<String>,
        option_a: impl Into<String>,
        option_b: impl Into<String>,
    ) -> Self {
        Self {
            context,
            option_a: option_a.into(),
            option_b: option_b.into(),
        }
    }
}

/// The judge's decision. `wrong` and `right` are always the two submitted options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictResult {
    pub wrong: String,
    pub right: String,
    pub reason: String,
}

impl VerdictResult {
    /// Map the model's `wrong`/`right` back onto the submitted options.
    ///
    /// Matching ignores surrounding whitespace and ASCII case, and accepts the
    /// labels "A"/"Option A" when no option text matches. The returned verdict
    /// carries the submitted option text verbatim (trimmed).
    pub fn reconcile(self, option_a: &str, option_b: &str) -> Result<Self> {
        let a = option_a.trim();
        let b = option_b.trim();

        let (wrong, right) = match (resolve(&self.wrong, a, b), resolve(&self.right, a, b)) {
            (Some(Side::A), Some(Side::B)) => (a, b),
            (Some(Side::B), Some(Side::A)) => (b, a),
            (None, _) => {
                return Err(self.rejected("\"wrong\" does not name either submitted option"));
            }
            (Some(_), None) => {
                return Err(self.rejected("\"right\" does not name the other submitted option"));
            }
            (Some(_), Some(_)) => {
                return Err(self.rejected("\"wrong\" and \"right\" name the same option"));
            }
        };

        Ok(Self {
            wrong: wrong.to_string(),
            right: right.to_string(),
            reason: self.reason,
        })
    }

    fn rejected(&self, message: &str) -> VerdictError {
        VerdictError::Parse {
            message: message.to_string(),
            raw: None,
            parsed: serde_json::to_value(self).ok(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    A,
    B,
}

fn resolve(candidate: &str, a: &str, b: &str) -> Option<Side> {
    let candidate = candidate.trim();

    if candidate.eq_ignore_ascii_case(a) {
        return Some(Side::A);
    }
    if candidate.eq_ignore_ascii_case(b) {
        return Some(Side::B);
    }

    let label = candidate
        .strip_prefix("Option ")
        .or_else(|| candidate.strip_prefix("option "))
        .unwrap_or(candidate);
    match label {
        "A" | "a" => Some(Side::A),
        "B" | "b" => Some(Side::B),
        _ => None,
    }
}
