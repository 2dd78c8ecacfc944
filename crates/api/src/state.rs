use std::sync::Arc;

use hippolens_core::dataset::Dataset;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; the dataset snapshot is never mutated after startup.
#[derive(Clone)]
pub struct AppState {
    /// Annotation dataset loaded at startup.
    pub dataset: Arc<Dataset>,
    /// Server configuration (upload limits are read by handlers).
    pub config: Arc<ServerConfig>,
}
