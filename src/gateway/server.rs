use super::error::ApiError;
use crate::brain::verdict::{JudgeService, VerdictRequest, VerdictResult};
use crate::config::ServerConfig;
use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    response::Json,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::Instrument;
use uuid::Uuid;

/// Shared state for the gateway.
#[derive(Clone)]
pub struct GatewayState {
    pub judge: Arc<JudgeService>,
}

/// Build the axum router.
pub fn build_router(state: GatewayState, allowed_origins: &[String]) -> Router {
    let cors = if allowed_origins.is_empty() {
        CorsLayer::new()
    } else {
        let origins: Vec<_> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/api/verdict", post(handle_verdict))
        .route("/api/health", get(health_check))
        .layer(cors)
        .with_state(state)
}

/// Start the gateway and serve until Ctrl+C or SIGTERM.
pub async fn start_server(config: &ServerConfig, judge: Arc<JudgeService>) -> anyhow::Result<()> {
    let app = build_router(GatewayState { judge }, &config.allowed_origins);
    let addr: SocketAddr = format!("{}:{}", config.bind, config.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid gateway address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("WhoIsWrong gateway listening on http://{}", addr);
    tracing::info!("   Verdict: POST http://{}/api/verdict", addr);
    tracing::info!("   Health:  GET  http://{}/api/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// POST /api/verdict — judge one dispute.
async fn handle_verdict(
    State(state): State<GatewayState>,
    payload: Result<Json<VerdictRequest>, JsonRejection>,
) -> Result<Json<VerdictResult>, ApiError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("verdict", %request_id);

    async move {
        let Json(request) = payload.map_err(|rejection| {
            tracing::warn!("Rejected request body: {}", rejection.body_text());
            ApiError::from(rejection)
        })?;

        match state.judge.verdict(&request).await {
            Ok(verdict) => Ok(Json(verdict)),
            Err(e) => {
                tracing::warn!("Verdict failed ({}): {}", e.code(), e);
                Err(e.into())
            }
        }
    }
    .instrument(span)
    .await
}

/// GET /api/health — health check.
async fn health_check(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "provider": state.judge.provider_name(),
        "model": state.judge.model(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::test_helpers::{MockProvider, Reply};
    use crate::config::JudgeConfig;
    use crate::gateway::ErrorBody;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    fn app(reply: Reply) -> Router {
        let judge = JudgeService::new(MockProvider::new(reply), &JudgeConfig::default());
        build_router(
            GatewayState {
                judge: Arc::new(judge),
            },
            &[],
        )
    }

    fn verdict_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/verdict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn read_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    const DISHES: &str =
        r#"{"context":"","optionA":"left the dishes","optionB":"ignored a text"}"#;

    #[tokio::test]
    async fn test_health_endpoint() {
        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .expect("request");

        let resp = app(Reply::Text("{}")).oneshot(req).await.expect("response");
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = read_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["model"], JudgeConfig::default().model);
        assert_eq!(body["provider"], "mock");
    }

    #[tokio::test]
    async fn test_verdict_success() {
        let app = app(Reply::Text(
            r#"{"wrong":"left the dishes","right":"ignored a text","reason":"dishes pile up"}"#,
        ));
        let resp = app.oneshot(verdict_request(DISHES)).await.expect("response");
        assert_eq!(resp.status(), StatusCode::OK);

        let verdict: VerdictResult = read_json(resp).await;
        assert_eq!(verdict.wrong, "left the dishes");
        assert_eq!(verdict.right, "ignored a text");
        assert_eq!(verdict.reason, "dishes pile up");
    }

    #[tokio::test]
    async fn test_missing_option_is_bad_request() {
        let resp = app(Reply::Text("{}"))
            .oneshot(verdict_request(r#"{"optionA":"left the dishes"}"#))
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorBody = read_json(resp).await;
        assert_eq!(body.code, "validation_error");
        assert!(body.message.contains("optionB"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let resp = app(Reply::Text("{}"))
            .oneshot(verdict_request("{not json"))
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorBody = read_json(resp).await;
        assert_eq!(body.code, "validation_error");
    }

    #[tokio::test]
    async fn test_timeout_is_gateway_timeout() {
        let resp = app(Reply::Timeout)
            .oneshot(verdict_request(DISHES))
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);

        let body: ErrorBody = read_json(resp).await;
        assert_eq!(body.code, "upstream_timeout");
    }

    #[tokio::test]
    async fn test_upstream_auth_is_bad_gateway() {
        let resp = app(Reply::Auth)
            .oneshot(verdict_request(DISHES))
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let body: ErrorBody = read_json(resp).await;
        assert_eq!(body.code, "upstream_auth");
    }

    #[tokio::test]
    async fn test_unparseable_reply_returns_raw_text() {
        let resp = app(Reply::Text("I refuse to pick a side."))
            .oneshot(verdict_request(DISHES))
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let body: ErrorBody = read_json(resp).await;
        assert_eq!(body.code, "parse_error");
        assert_eq!(body.raw.as_deref(), Some("I refuse to pick a side."));
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let judge = JudgeService::new(MockProvider::new(Reply::Text("{}")), &JudgeConfig::default());
        let app = build_router(
            GatewayState {
                judge: Arc::new(judge),
            },
            &["http://localhost:5173".to_string()],
        );

        let req = Request::builder()
            .uri("/api/health")
            .header(header::ORIGIN, "http://localhost:5173")
            .body(Body::empty())
            .expect("request");
        let resp = app.oneshot(req).await.expect("response");
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:5173")
        );
    }
}
