//! Verdict generation
//!
//! Turns a dispute into a decisive verdict:
//! [`prompt`] composes the messages, the provider runs the completion,
//! [`parser`] recovers the JSON verdict, and [`JudgeService`] ties the steps
//! together and checks the verdict names the submitted options.

pub mod error;
pub mod parser;
pub mod prompt;
pub mod service;
pub mod types;

pub use error::{Result, VerdictError};
pub use parser::{ParseStage, extract_json, parse_verdict};
pub use prompt::{ComposedPrompt, compose, compose_with_limit};
pub use service::JudgeService;
pub use types::{VerdictRequest, VerdictResult};
