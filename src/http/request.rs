//! Request parsing.
//!
//! # Responsibilities
//! - Request ID header name shared by the id layers
//! - Decode the legacy `{"app": "<name>"}` decision body
//! - Parse the optional forced outcome and `If-Match` version

use axum::http::{header, HeaderMap, Request};
use serde::Deserialize;

use crate::canary::error::{CanaryError, CanaryResult};
use crate::canary::types::Outcome;
use crate::store::Version;

pub const X_REQUEST_ID: &str = "x-request-id";

/// The id assigned by the request-id layer, or `-` when absent.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

/// Body of the legacy `PUT /` decision request.
#[derive(Debug, Deserialize)]
pub struct AppRequest {
    #[serde(default)]
    pub app: String,
}

/// Query string of `GET /apps/{name}/cookie`.
#[derive(Debug, Default, Deserialize)]
pub struct DecisionQuery {
    pub outcome: Option<String>,
}

impl DecisionQuery {
    pub fn forced_outcome(&self) -> CanaryResult<Option<Outcome>> {
        self.outcome.as_deref().map(str::parse).transpose()
    }
}

/// Extract the app name from a legacy decision body.
pub fn decode_app_name(body: &[u8]) -> Result<String, String> {
    let request: AppRequest = serde_json::from_slice(body).map_err(|e| e.to_string())?;
    if request.app.is_empty() {
        return Err("must specify key = 'app'".to_string());
    }
    Ok(request.app)
}

/// Version the caller read, from `If-Match`. `*` means any version.
pub fn if_match(headers: &HeaderMap) -> CanaryResult<Option<Version>> {
    let Some(value) = headers.get(header::IF_MATCH) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| CanaryError::InvalidArgument("If-Match is not valid text".into()))?;
    if value.trim() == "*" {
        return Ok(None);
    }
    value.parse().map(Some)
}
