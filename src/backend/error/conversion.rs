/**
 * Error Conversion
 *
 * `IntoResponse` implementations for `BackendError` and the success
 * envelope. Both are returned with HTTP 200; callers read `status` and
 * `code` from the body.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "status": false,
 *   "code": 404,
 *   "message": "User not found",
 *   "data": null,
 *   "version": "Secure Chat v1.0"
 * }
 * ```
 */

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::backend::error::types::BackendError;
use crate::shared::ApiResponse;

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

impl IntoResponse for BackendError {
    /// Convert a backend error into an error envelope
    ///
    /// Server-side failures are logged with their details here, since the
    /// envelope only carries a generic message.
    fn into_response(self) -> Response {
        if self.status_code().is_server_error() {
            tracing::error!("[Server] Request failed: {}", self);
        } else {
            tracing::debug!("[Server] Request rejected: {}", self);
        }

        ApiResponse::<()>::error(self.code(), self.message()).into_response()
    }
}
