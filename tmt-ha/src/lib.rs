//! tmt-ha library - Crop Health Assessment service
//!
//! Accepts a leaf photograph and a soil/environment reading, runs both
//! classifiers and fuses their confidences into a crop health verdict.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod models;
pub mod preprocess;

pub use crate::error::{ApiError, ApiResult};

use crate::models::{DiseaseClassifier, SuitabilityClassifier};

/// Application state shared across HTTP handlers
///
/// Models are loaded once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Leaf disease image classifier
    pub disease: Arc<dyn DiseaseClassifier>,
    /// Soil/environment suitability classifier
    pub suitability: Arc<dyn SuitabilityClassifier>,
    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        disease: Arc<dyn DiseaseClassifier>,
        suitability: Arc<dyn SuitabilityClassifier>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            disease,
            suitability,
            max_upload_bytes,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let body_limit = state.max_upload_bytes;

    Router::new()
        .merge(api::ui_routes())
        .route("/api/analyze", post(api::analyze_crop))
        .route("/api/fuse", post(api::fuse_scores))
        .route("/api/classes", get(api::list_classes))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
