use axum::routing::get;
use axum::Router;

use crate::handlers::dataset;
use crate::state::AppState;

/// Dataset routes.
///
/// ```text
/// GET    /dataset-info     -> dataset_info
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/dataset-info", get(dataset::dataset_info))
}
