use axum::{
    Json,
    body::Body,
    http::{Response, StatusCode},
    response::IntoResponse,
};
use serde_json::json;

use crate::error::CatalogError;

const SERVER_ERROR_MESSAGE: &str = "Sorry, something went wrong on our server";

/// Errors returned by HTTP handlers.
///
/// Client errors render as `{status: "fail", message}` and keep their
/// message. `Internal` renders a generic message and logs the full report.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(color_eyre::Report),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(message) => Self::NotFound(message),
            CatalogError::Invariant(message) => Self::BadRequest(message),
            CatalogError::Authorization(message) => Self::Forbidden(message),
            CatalogError::Internal(report) => Self::Internal(report),
        }
    }
}

impl From<color_eyre::Report> for ApiError {
    fn from(report: color_eyre::Report) -> Self {
        Self::Internal(report)
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response<Body> {
        let status = self.status_code();

        let body = match self {
            Self::Internal(report) => {
                tracing::error!("{report:?}");
                json!({ "status": "error", "message": SERVER_ERROR_MESSAGE })
            }
            client_error => json!({ "status": "fail", "message": client_error.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
