use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::canary::types::{AppRecord, ConfigSet};
use crate::http::request::if_match;
use crate::http::response::{with_etag, ApiError};
use crate::http::server::AppState;
use crate::observability::metrics;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub store: String,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        store: state.service.store().location(),
    })
}

/// `GET /apps`: the whole record set.
pub async fn list_apps(State(state): State<AppState>) -> Response {
    match state.service.load().await {
        Ok((set, version)) => with_etag(Json::<ConfigSet>(set).into_response(), version),
        Err(e) => ApiError(e).into_response(),
    }
}

/// `GET /apps/{name}`.
pub async fn get_app(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.service.record(&name).await {
        Ok((record, version)) => with_etag(Json(record).into_response(), version),
        Err(e) => ApiError(e).into_response(),
    }
}

/// `PUT /apps/{name}`: replace the record, honoring `If-Match`.
pub async fn put_app(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Json(record): Json<AppRecord>,
) -> Response {
    if record.name != name {
        metrics::record_request("update", 400);
        return (
            StatusCode::BAD_REQUEST,
            format!("Body names '{}' but path names '{}'", record.name, name),
        )
            .into_response();
    }

    let expected = match if_match(&headers) {
        Ok(expected) => expected,
        Err(e) => return ApiError(e).into_response(),
    };

    let response = match state.service.update(record.clone(), expected).await {
        Ok(version) => with_etag(Json(record).into_response(), version),
        Err(e) => ApiError(e).into_response(),
    };
    metrics::record_request("update", response.status().as_u16());
    response
}
