//! WhoIsWrong - an LLM judge for everyday disputes
//!
//! Given two sides of a disagreement and optional context, WhoIsWrong asks an
//! OpenAI-compatible chat model to pick the side that is wrong and explain why.
//!
//! ## Pipeline
//!
//! - **Prompt composer:** validates the dispute and builds the system and user messages
//! - **Model invoker:** one bounded call to the chat completions endpoint
//! - **Response parser:** tolerant JSON recovery from chatty model output
//!
//! ## Quick Start
//!
//! ```bash
//! # Judge from the terminal
//! whoiswrong judge -a "left the dishes" -b "ignored a text"
//!
//! # Serve POST /api/verdict
//! whoiswrong serve --port 8787
//! ```

pub mod brain;
pub mod cli;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod utils;

// Re-export commonly used types
pub use brain::verdict::{JudgeService, VerdictError, VerdictRequest, VerdictResult};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
