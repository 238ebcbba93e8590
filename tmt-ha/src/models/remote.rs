//! Leaf disease classifier served over the TensorFlow Serving REST API
//!
//! `POST {endpoint}/v1/models/{model}:predict`
//!
//! Request body: `{"instances": [<224×224×3 nested array>]}`
//! Response body: `{"predictions": [[p0, ..., p14]]}`

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tmt_common::{Error, Result};
use tracing::debug;

use super::DiseaseClassifier;
use crate::preprocess::{LeafTensor, CHANNELS};

const USER_AGENT: &str = concat!("tmt-ha/", env!("CARGO_PKG_VERSION"));

#[derive(Serialize)]
struct PredictRequest {
    instances: Vec<Vec<Vec<[f32; CHANNELS]>>>,
}

#[derive(Deserialize)]
struct PredictResponse {
    predictions: Vec<Vec<f32>>,
}

/// TensorFlow Serving client for the leaf disease CNN
pub struct RemoteDiseaseClassifier {
    http_client: reqwest::Client,
    predict_url: String,
}

impl RemoteDiseaseClassifier {
    /// Create a client for `model` hosted at `endpoint` (e.g. `http://127.0.0.1:8501`)
    pub fn new(endpoint: &str, model: &str, timeout: Duration) -> Result<Self> {
        if model.trim().is_empty() {
            return Err(Error::Config("Disease model name is empty".to_string()));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Model(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            predict_url: predict_url(endpoint, model),
        })
    }

    /// Full predict URL
    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }
}

/// Build the predict URL, tolerating a trailing slash on the endpoint
pub fn predict_url(endpoint: &str, model: &str) -> String {
    format!(
        "{}/v1/models/{}:predict",
        endpoint.trim_end_matches('/'),
        model
    )
}

/// Extract the single probability row from a predict response
fn single_prediction(response: PredictResponse) -> Result<Vec<f32>> {
    let mut predictions = response.predictions.into_iter();
    match (predictions.next(), predictions.next()) {
        (Some(row), None) => Ok(row),
        (None, _) => Err(Error::Model("Serving response contained no predictions".to_string())),
        (Some(_), Some(_)) => Err(Error::Model(
            "Serving response contained more than one prediction".to_string(),
        )),
    }
}

#[async_trait::async_trait]
impl DiseaseClassifier for RemoteDiseaseClassifier {
    fn name(&self) -> &'static str {
        "tensorflow-serving"
    }

    async fn predict(&self, image: &LeafTensor) -> Result<Vec<f32>> {
        let body = PredictRequest {
            instances: vec![image.to_nested()],
        };

        debug!(url = %self.predict_url, "Requesting leaf disease prediction");

        let response = self
            .http_client
            .post(&self.predict_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Model(format!("Prediction request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Model(format!(
                "Serving endpoint returned {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let parsed: PredictResponse = response
            .json()
            .await
            .map_err(|e| Error::Model(format!("Invalid serving response: {}", e)))?;

        single_prediction(parsed)
    }
}
