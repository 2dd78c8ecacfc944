//! Read-only dataset information.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetInfo {
    total_images: usize,
    message: &'static str,
}

/// GET /api/dataset-info
pub async fn dataset_info(State(state): State<AppState>) -> Json<DatasetInfo> {
    Json(DatasetInfo {
        total_images: state.dataset.len(),
        message: "Dataset loaded successfully",
    })
}
