//! Response mapping.
//!
//! # Responsibilities
//! - Map `CanaryError` kinds to HTTP status codes
//! - Keep store internals out of client-facing 5xx bodies
//! - Attach the store version as an `ETag`

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::canary::error::CanaryError;
use crate::store::Version;

/// A `CanaryError` on its way to the client.
#[derive(Debug)]
pub struct ApiError(pub CanaryError);

impl From<CanaryError> for ApiError {
    fn from(err: CanaryError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CanaryError::NotFound(_) => StatusCode::NOT_FOUND,
            CanaryError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CanaryError::Conflict { .. } => StatusCode::CONFLICT,
            CanaryError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            CanaryError::InvalidDuration(_)
            | CanaryError::InvalidPercent(_)
            | CanaryError::Io(_)
            | CanaryError::Parse(_)
            | CanaryError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match &self.0 {
            CanaryError::Io(_) | CanaryError::Parse(_) => "Could not read config file!".to_string(),
            CanaryError::InvalidDuration(_) | CanaryError::InvalidPercent(_) => {
                "Canary error!".to_string()
            }
            CanaryError::Task(_) => "Internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, status = %status, "Request failed");
        } else {
            tracing::warn!(error = %self.0, status = %status, "Request rejected");
        }
        (status, self.message()).into_response()
    }
}

/// Quoted `ETag` value for a store version.
pub fn etag(version: Version) -> HeaderValue {
    HeaderValue::from_str(&format!("\"{}\"", version))
        .unwrap_or_else(|_| HeaderValue::from_static("\"\""))
}

/// Add an `ETag` to `response`.
pub fn with_etag(mut response: Response, version: Version) -> Response {
    response.headers_mut().insert(header::ETAG, etag(version));
    response
}
