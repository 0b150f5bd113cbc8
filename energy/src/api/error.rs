//! Error boundary shared by every endpoint

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::future::Future;
use tracing::error;

/// Body returned when a report endpoint fails
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Body returned when a search fails
pub const SEARCH_FAILED_MESSAGE: &str = "Search failed";

/// A failed operation, rendered as a plain-text 500 with a fixed message.
/// The underlying error is logged, never sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiError {
    message: &'static str,
}

impl ApiError {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.message).into_response()
    }
}

/// Run one operation, converting any failure into an [`ApiError`]
pub async fn guarded<T, F>(
    operation: &'static str,
    failure_message: &'static str,
    work: F,
) -> Result<Json<T>, ApiError>
where
    T: Serialize,
    F: Future<Output = crate::Result<T>>,
{
    match work.await {
        Ok(value) => Ok(Json(value)),
        Err(err) => {
            error!(operation, error = %err, "Operation failed");
            Err(ApiError::new(failure_message))
        }
    }
}
