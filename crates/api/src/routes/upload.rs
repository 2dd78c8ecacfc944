//! Route definitions for image and folder uploads.
//!
//! Mounted at `/api`.

use axum::routing::post;
use axum::Router;

use crate::handlers::upload;
use crate::state::AppState;

/// Upload routes.
///
/// ```text
/// POST   /upload           -> upload_image    (multipart, field `image`)
/// POST   /upload-folder    -> upload_folder   (multipart, field `images`)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload::upload_image))
        .route("/upload-folder", post(upload::upload_folder))
}
