use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hippolens_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce `{ "error": CODE, "message": ... }`
/// bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `hippolens_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A malformed request (e.g. broken multipart body).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const SANITIZED_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SERVER_ERROR",
                    SANITIZED_MESSAGE.to_string(),
                )
            }
        };

        let body = json!({
            "error": code,
            "message": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a [`CoreError`] to an HTTP status, error code, and client message.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    let code = err.code();
    match err {
        CoreError::NoFileProvided => (StatusCode::BAD_REQUEST, code, "No file uploaded".to_string()),
        CoreError::UnsupportedFileType { .. } => (
            StatusCode::BAD_REQUEST,
            code,
            "Only image files (JPG, PNG) and medical files (DICOM, NIfTI) are allowed".to_string(),
        ),
        CoreError::NotInDataset { .. } => (
            StatusCode::BAD_REQUEST,
            code,
            "Please use an image from the specified dataset. The uploaded image does not match \
             any image in our database."
                .to_string(),
        ),
        CoreError::AnnotationMissing { .. } => (
            StatusCode::NOT_FOUND,
            code,
            "Image found but segmentation data is missing.".to_string(),
        ),
        CoreError::InvalidFilenamePattern { .. } | CoreError::TooManyFiles { .. } => {
            (StatusCode::BAD_REQUEST, code, err.to_string())
        }
        CoreError::FileTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, code, err.to_string()),
        CoreError::Dataset { .. } => {
            tracing::error!(error = %err, "Internal core error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                code,
                SANITIZED_MESSAGE.to_string(),
            )
        }
    }
}

/// Panic handler for `CatchPanicLayer::custom`.
///
/// Reports the panic through [`AppError::InternalError`] so clients get the
/// usual sanitized 500 body.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    AppError::InternalError(format!("handler panicked: {detail}")).into_response()
}
