//! Direct access to the decision fuser

use axum::Json;
use serde::Deserialize;
use tmt_common::{fuse_predictions, FusionResult};

use crate::error::{ApiError, ApiResult};

/// POST /api/fuse request body
#[derive(Debug, Deserialize)]
pub struct FuseRequest {
    pub disease_confidence: f64,
    pub suitability_score: f64,
}

/// POST /api/fuse
///
/// Blends two confidences without running any model. Values outside [0, 1]
/// are passed through to the fuser unchanged.
pub async fn fuse_scores(Json(request): Json<FuseRequest>) -> ApiResult<Json<FusionResult>> {
    if !request.disease_confidence.is_finite() || !request.suitability_score.is_finite() {
        return Err(ApiError::BadRequest(
            "Scores must be finite numbers".to_string(),
        ));
    }

    Ok(Json(fuse_predictions(
        request.disease_confidence,
        request.suitability_score,
    )))
}
