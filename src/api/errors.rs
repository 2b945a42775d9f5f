use crate::credentials::CredentialError;
use crate::google::GoogleError;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// API error type.
///
/// Every variant is reported the same way: HTTP 200 with
/// `{"success": 0, "err": "<message>"}`. Dashboard clients check `success`,
/// not the status code.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Credentials(CredentialError),
    Upstream(GoogleError),
    InvalidResponse(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            Self::Credentials(e) => write!(f, "{e}"),
            Self::Upstream(e) => write!(f, "{e}"),
            Self::InvalidResponse(msg) => write!(f, "Unexpected API response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Credentials(e) => Some(e),
            Self::Upstream(e) => Some(e),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::BadRequest(_) | Self::Credentials(_) => {
                tracing::warn!(error = %self, "Request rejected");
            }
            Self::Upstream(e) => tracing::error!(error = %e, "Google API call failed"),
            Self::InvalidResponse(msg) => tracing::error!(error = %msg, "Unexpected Google API response"),
        }

        let body = serde_json::json!({ "success": 0, "err": self.to_string() });
        (StatusCode::OK, Json(body)).into_response()
    }
}

impl From<CredentialError> for ApiError {
    fn from(e: CredentialError) -> Self {
        Self::Credentials(e)
    }
}

impl From<GoogleError> for ApiError {
    fn from(e: GoogleError) -> Self {
        Self::Upstream(e)
    }
}

// Keeps malformed query strings inside the JSON error envelope.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
