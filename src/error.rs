//! User-facing error taxonomy. Every backend failure is converted here; none
//! escape a handler unconverted.

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::backend::BackendError;
use crate::routes::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad or missing credentials, expired session
    #[error("{0}")]
    Auth(String),
    /// Authenticated identity without the admin flag; already signed out
    #[error("Unauthorized: Admin access only")]
    NotAdmin,
    #[error("Failed to load {what}")]
    Fetch {
        what: &'static str,
        #[source]
        source: BackendError,
    },
    #[error("Failed to {what}")]
    Write {
        what: &'static str,
        #[source]
        source: BackendError,
    },
    /// Metadata insert failed and the uploaded object could not be removed
    #[error("Failed to save content; uploaded file left at {path}")]
    Orphaned {
        path: String,
        #[source]
        source: BackendError,
    },
    #[error("{0}")]
    Validation(String),
    /// Body over the route's size limit
    #[error("{0}")]
    TooLarge(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Backend not configured")]
    Unavailable,
    /// A server-side capacity limit was hit
    #[error("{0}")]
    Busy(String),
}

impl AppError {
    /// `map_err` adapter for failed reads
    pub fn fetch(what: &'static str) -> impl FnOnce(BackendError) -> AppError {
        move |source| AppError::Fetch { what, source }
    }

    /// `map_err` adapter for failed writes; a missing row becomes `NotFound`
    pub fn write(what: &'static str) -> impl FnOnce(BackendError) -> AppError {
        move |source| match source {
            BackendError::NotFound(thing) => AppError::NotFound(thing),
            source => AppError::Write { what, source },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::NotAdmin => StatusCode::FORBIDDEN,
            AppError::Fetch { .. } | AppError::Write { .. } | AppError::Orphaned { .. } => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unavailable | AppError::Busy(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Fetch { source, .. }
            | AppError::Write { source, .. }
            | AppError::Orphaned { source, .. } => {
                tracing::error!(error = %source, "{}", self);
                Some(source.to_string())
            }
            AppError::Auth(_) | AppError::NotAdmin => {
                tracing::warn!("{}", self);
                None
            }
            _ => None,
        };

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Extractor rejections keep a 413 for oversized bodies; anything else is a bad request
fn rejected(status: StatusCode, text: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::TooLarge(text)
    } else {
        AppError::Validation(text)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}
