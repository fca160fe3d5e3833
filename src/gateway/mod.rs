//! HTTP gateway for the judge, powered by axum.
//!
//! Serves:
//! - `POST /api/verdict` — judge one dispute
//! - `GET  /api/health`  — health check

pub mod error;
pub mod server;

pub use error::{ApiError, ErrorBody};
pub use server::{GatewayState, build_router, start_server};
