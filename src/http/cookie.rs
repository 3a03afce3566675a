//! Canary decision endpoints.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::http::request::{decode_app_name, DecisionQuery};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// `PUT /` with `{"app": "<name>"}`.
pub async fn legacy_decision(State(state): State<AppState>, body: Bytes) -> Response {
    let app = match decode_app_name(&body) {
        Ok(app) => app,
        Err(e) => {
            tracing::warn!(error = %e, "Decode appName error");
            metrics::record_request("legacy_decision", 400);
            return (
                StatusCode::BAD_REQUEST,
                "Could not read PUT json. Make sure you PUT a json with {app: <app_name>}",
            )
                .into_response();
        }
    };

    let response = match state.service.decide(&app, None).await {
        Ok(decision) => Json(decision).into_response(),
        Err(e) => ApiError(e).into_response(),
    };
    metrics::record_request("legacy_decision", response.status().as_u16());
    response
}

/// `GET /apps/{name}/cookie[?outcome=success|fail]`.
pub async fn get_decision(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<DecisionQuery>,
) -> Response {
    let result = match query.forced_outcome() {
        Ok(forced) => state.service.decide(&name, forced).await,
        Err(e) => Err(e),
    };
    let response = match result {
        Ok(decision) => Json(decision).into_response(),
        Err(e) => ApiError(e).into_response(),
    };
    metrics::record_request("decision", response.status().as_u16());
    response
}

pub async fn health() -> &'static str {
    "ok"
}
