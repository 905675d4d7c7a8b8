use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Failure kinds surfaced by the executive proxy. Each maps onto exactly one
/// HTTP status code at the web boundary.
#[derive(Debug, Error)]
pub enum HmiError {
    /// Transport or RPC failure talking to the executive or the solution service.
    #[error("{0}")]
    BackendUnavailable(String),
    /// The current operation carries metadata that is not a run metadata payload.
    #[error("could not decode run metadata: {0}")]
    MalformedMetadata(String),
    #[error("process \"{0}\" not found")]
    ProcessNotFound(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl HmiError {
    pub fn backend(context: &str, err: impl std::fmt::Display) -> Self {
        HmiError::BackendUnavailable(format!("{context}: {err}"))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            HmiError::BackendUnavailable(_)
            | HmiError::MalformedMetadata(_)
            | HmiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HmiError::ProcessNotFound(_) | HmiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            HmiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

/// Uniform `{"error": "..."}` envelope for every failed API call.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for HmiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed ({}): {}", status, self);
        } else {
            tracing::warn!("Request rejected ({}): {}", status, self);
        }
        crate::interfaces::web::response::json_response(
            status,
            &ErrorResponse {
                error: self.to_string(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_bad_request() {
        assert_eq!(
            HmiError::ProcessNotFound("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HmiError::InvalidRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn backend_and_metadata_errors_map_to_internal_error() {
        assert_eq!(
            HmiError::BackendUnavailable("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            HmiError::MalformedMetadata("bad".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn process_not_found_message_quotes_the_name() {
        let err = HmiError::ProcessNotFound("pick_and_place".into());
        assert_eq!(err.to_string(), "process \"pick_and_place\" not found");
    }

    #[test]
    fn backend_helper_prefixes_context() {
        let err = HmiError::backend("could not list operations", "connection refused");
        assert_eq!(
            err.to_string(),
            "could not list operations: connection refused"
        );
    }
}
