//! API key gate for admin routes.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::AuthConfig;
use crate::http::server::AppState;

/// Accepts the configured key either raw or as a Bearer token.
pub fn is_authorized(auth: &AuthConfig, header_value: Option<&str>) -> bool {
    if !auth.enabled {
        return true;
    }
    match header_value {
        Some(value) => {
            let token = value.strip_prefix("Bearer ").unwrap_or(value);
            !auth.api_key.is_empty() && token == auth.api_key
        }
        None => false,
    }
}

pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    if is_authorized(&state.auth, auth_header) {
        return next.run(request).await;
    }

    tracing::warn!(path = %request.uri().path(), "Rejected request with invalid API key");
    (StatusCode::FORBIDDEN, "Invalid API Key").into_response()
}
