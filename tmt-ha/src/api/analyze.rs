//! Crop analysis endpoint
//!
//! Multipart form fields:
//! - `image`: leaf photograph (jpg, jpeg or png)
//! - `nitrogen`, `phosphorus`, `potassium`, `temperature`, `humidity`,
//!   `ph`, `rainfall`: soil/environment reading (missing fields use the
//!   form defaults)

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tmt_common::soil::FIELDS;
use tmt_common::{fuse_predictions, FusionResult, SoilReading};
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::models::{classify_disease, suitability_score};
use crate::preprocess::{prepare_leaf_image, PreprocessError};
use crate::AppState;

/// Multipart field carrying the leaf image
pub const IMAGE_FIELD: &str = "image";

/// POST /api/analyze response
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    /// Detected condition (disease class label)
    pub condition: &'static str,
    pub class_index: usize,
    /// Top-class probability of the leaf classifier
    pub disease_confidence: f64,
    /// Top-class probability of the suitability classifier
    pub suitability_score: f64,
    /// Reading the suitability score was computed from
    pub soil: SoilReading,
    pub fusion: FusionResult,
    /// Final score rendered with exactly two decimals (e.g. "0.90")
    pub final_score_display: String,
}

/// Parsed analysis form
#[derive(Debug)]
struct AnalyzeForm {
    image: Option<Vec<u8>>,
    soil: SoilReading,
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

async fn read_form(mut multipart: Multipart) -> ApiResult<AnalyzeForm> {
    let mut form = AnalyzeForm {
        image: None,
        soil: SoilReading::default(),
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == IMAGE_FIELD {
            let bytes = field.bytes().await.map_err(multipart_error)?;
            form.image = Some(bytes.to_vec());
        } else if FIELDS.iter().any(|f| f.name == name) {
            let value = field.text().await.map_err(multipart_error)?;
            if !value.trim().is_empty() {
                form.soil.set_field(&name, &value)?;
            }
        } else {
            debug!(field = %name, "Ignoring unknown form field");
        }
    }

    Ok(form)
}

/// POST /api/analyze
///
/// Runs both classifiers and fuses their confidences.
pub async fn analyze_crop(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<AnalyzeResponse>> {
    let form = read_form(multipart).await?;

    let image = match form.image {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return Err(PreprocessError::Empty.into()),
    };

    form.soil.validate()?;

    let tensor = tokio::task::spawn_blocking(move || prepare_leaf_image(&image))
        .await
        .map_err(|e| ApiError::Internal(format!("Image preprocessing task failed: {}", e)))??;

    let disease = classify_disease(state.disease.as_ref(), &tensor).await?;
    let suitability = suitability_score(state.suitability.as_ref(), &form.soil)?;

    let fusion = fuse_predictions(disease.confidence, suitability);

    info!(
        condition = disease.label,
        disease_confidence = disease.confidence,
        suitability_score = suitability,
        final_score = fusion.final_score,
        status = %fusion.status,
        "Crop analysis complete"
    );

    Ok(Json(AnalyzeResponse {
        condition: disease.label,
        class_index: disease.class_index,
        disease_confidence: disease.confidence,
        suitability_score: suitability,
        soil: form.soil,
        final_score_display: fusion.formatted_score(),
        fusion,
    }))
}
