use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use vellum_schema::SchemaError;
use vellum_store::StoreError;
use vellum_version::VersionError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl From<SchemaError> for ServerError {
    fn from(err: SchemaError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        Self::Config(err.to_string())
    }
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Version(VersionError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Version(VersionError::Permission { .. }) => StatusCode::FORBIDDEN,
            Self::Version(VersionError::Schema(_) | VersionError::UnsupportedField { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Version(VersionError::Transport(_)) => StatusCode::BAD_GATEWAY,
            Self::Version(VersionError::UnknownLocale(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
