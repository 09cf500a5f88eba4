use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use courier_db::DbError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Db(e) => match e {
                DbError::Validation(_) | DbError::Serialization(_) => StatusCode::BAD_REQUEST,
                DbError::Auth(_) => StatusCode::UNAUTHORIZED,
                DbError::NotFound { .. } => StatusCode::NOT_FOUND,
                DbError::Duplicate { .. } => StatusCode::CONFLICT,
                DbError::Dependency(_) => StatusCode::UNPROCESSABLE_ENTITY,
                DbError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                DbError::Store(_) | DbError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::AuthFailed(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
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
            tracing::debug!(%status, error = %self, "request rejected");
        }
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
