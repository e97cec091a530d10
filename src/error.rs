use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Relay error taxonomy.
///
/// `Delivery` is recorded per target inside a dispatch report and never
/// aborts delivery to the remaining targets; the other variants surface to
/// the triggering HTTP request or scheduled job.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Required external configuration is missing.
    #[error("missing configuration: {0}")]
    Config(String),
    /// The remote lottery source failed or returned a non-success payload.
    #[error("upstream fetch failed: {0}")]
    Upstream(String),
    /// Local state read/write failure.
    #[error("storage failure: {0}")]
    Storage(String),
    /// A single target's push failed.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match &self {
            RelayError::Config(_) | RelayError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::Upstream(_) | RelayError::Delivery(_) => StatusCode::BAD_GATEWAY,
        };
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;
