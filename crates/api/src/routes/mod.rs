pub mod dataset;
pub mod health;
pub mod upload;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                  liveness probe
/// /dataset-info            dataset size
/// /upload                  single image upload (multipart)
/// /upload-folder           patient folder upload (multipart)
/// ```
///
/// `/api/images/**` is a static mount added by the router builder.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(dataset::router())
        .merge(upload::router())
}
