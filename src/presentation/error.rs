// HTTP error mapping
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("backend unavailable")]
    Backend(anyhow::Error),
    #[error("internal error")]
    Internal(StatusCode),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Backend(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(status) => *status,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Backend(err)
    }
}

impl From<StatusCode> for ApiError {
    fn from(status: StatusCode) -> Self {
        Self::Internal(status)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Backend(err) = &self {
            tracing::error!(error = %format!("{err:#}"), "Backend request failed");
        }
        (self.status(), self.to_string()).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
