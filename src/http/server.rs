//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with decision, health and admin handlers
//! - Wire up middleware (request ID, tracing, body limit, timeout)
//! - Bind server to listener
//! - Stop on the shutdown broadcast

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, Request},
    routing::{get, put},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::Span;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::{AuthConfig, ServiceConfig};
use crate::http::cookie::{get_decision, health, legacy_decision};
use crate::http::request::{request_id, X_REQUEST_ID};
use crate::service::CanaryService;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: CanaryService,
    pub auth: Arc<AuthConfig>,
}

/// HTTP server for the canary controller.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig, service: CanaryService) -> Self {
        let state = AppState {
            service,
            auth: Arc::new(config.auth.clone()),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/", put(legacy_decision))
            .route("/health", get(health))
            .route("/apps/{name}/cookie", get(get_decision))
            .with_state(state.clone())
            .merge(setup_admin_router(state))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID)))
            .layer(SetRequestIdLayer::new(
                HeaderName::from_static(X_REQUEST_ID),
                MakeRequestUuid,
            ))
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            auth_enabled = self.config.auth.enabled,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Span for one request; the id is set by the outer request-id layer.
fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id(request),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::store::{ConfigStore, MemoryBackend};

    const STORE: &str = "\
Apps:
- Name: jupyterhub
  CookieInfo:
    Expiration: 48h
    CanaryPercent: 0.9
    IfSuccessful:
      Key: a
      Value: a
    IfFail:
      Key: b
      Value: b
Port: 8080
";

    fn router(auth: bool) -> Router {
        router_with(STORE, auth)
    }

    fn router_with(store: &str, auth: bool) -> Router {
        let mut config = ServiceConfig::default();
        config.auth.enabled = auth;
        config.auth.api_key = "k".into();
        let service = CanaryService::new(
            Arc::new(ConfigStore::new(MemoryBackend::new(store))),
            Duration::from_secs(1),
        );
        HttpServer::new(config, service).router()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_forced_decision_route() {
        let response = router(true)
            .oneshot(
                Request::get("/apps/jupyterhub/cookie?outcome=fail")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["key"], "b");
        assert_eq!(json["canaryPercent"], 0.9);
    }

    #[tokio::test]
    async fn test_broken_stored_record_is_server_error() {
        for broken in [
            STORE.replace("Expiration: 48h", "Expiration: soon"),
            STORE.replace("CanaryPercent: 0.9", "CanaryPercent: 1.5"),
            STORE.replace("CanaryPercent: 0.9", "CanaryPercent: .nan"),
        ] {
            let response = router_with(&broken, true)
                .oneshot(
                    Request::get("/apps/jupyterhub/cookie")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body_text(response).await, "Canary error!");
        }
    }

    #[tokio::test]
    async fn test_bad_forced_outcome_is_client_error() {
        let response = router(true)
            .oneshot(
                Request::get("/apps/jupyterhub/cookie?outcome=maybe")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_legacy_route() {
        let response = router(true)
            .oneshot(
                Request::put("/")
                    .body(Body::from(r#"{"app":"other-app"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "Could not find application other-app");
    }

    #[tokio::test]
    async fn test_incoming_request_id_is_echoed() {
        let response = router(true)
            .oneshot(
                Request::get("/health")
                    .header(X_REQUEST_ID, "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()[X_REQUEST_ID], "req-42");
    }

    #[tokio::test]
    async fn test_admin_gate() {
        let denied = router(true)
            .oneshot(Request::get("/apps/jupyterhub").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);

        let allowed = router(true)
            .oneshot(
                Request::get("/apps/jupyterhub")
                    .header(header::AUTHORIZATION, "Bearer k")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(allowed.status(), StatusCode::OK);
        assert!(allowed.headers().contains_key(header::ETAG));

        let open = router(false)
            .oneshot(Request::get("/apps").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(open.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_body_limit() {
        let oversized = format!(r#"{{"app":"{}"}}"#, "x".repeat(128 * 1024));
        let response = router(true)
            .oneshot(Request::put("/").body(Body::from(oversized)).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
