//! Error types for the coauth server.
//!
//! Uses `thiserror` for the taxonomy and maps each variant onto the JSON error
//! body the emulated clients expect.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Routine negative outcomes of the device flow.
///
/// Neither variant is a server fault; both are answered and forgotten.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowError {
    /// Unknown device code / client id pair, or an unknown resource.
    #[error("Not Found")]
    NotFound,

    /// Missing, malformed or unknown bearer token.
    #[error("Unauthorized")]
    Unauthorized,
}

impl FlowError {
    /// HTTP status this error is reported with.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for FlowError {
    fn into_response(self) -> Response {
        (self.status(), Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Result type alias for device-flow operations.
pub type FlowResult<T> = Result<T, FlowError>;
