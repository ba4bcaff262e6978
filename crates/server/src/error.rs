// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use odn_flow_api::ApiError;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable error kind.
    pub kind: String,
    /// Human-readable message.
    pub message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
pub struct HttpError {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error kind reported to the client.
    pub kind: &'static str,
    /// The error message.
    pub message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            kind: self.kind.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Returns the status code an API error is reported with.
pub const fn status_for(err: &ApiError) -> StatusCode {
    match err {
        ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
        ApiError::InvalidTransition { .. }
        | ApiError::DuplicateOdn { .. }
        | ApiError::DuplicateAssignment { .. }
        | ApiError::StaleWrite { .. } => StatusCode::CONFLICT,
        ApiError::OdnLocked { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ApiError::MissingReason | ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
        ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
        ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = status_for(&err);
        if status.is_server_error() {
            error!(error = %err, "Request failed");
        }
        Self {
            status,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl HttpError {
    /// Builds a 400 response for a malformed request parameter.
    pub fn bad_request(field: &str, message: impl Into<String>) -> Self {
        Self::from(ApiError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        })
    }
}
