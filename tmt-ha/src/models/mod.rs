//! Model backends
//!
//! Both classifiers are opaque pre-trained artifacts. The service only needs
//! their per-class probabilities; the top-class probability of each becomes
//! an input to the decision fuser.
//!
//! # Backends
//! - [`RemoteDiseaseClassifier`]: leaf CNN hosted on a TensorFlow Serving REST endpoint
//! - [`ForestSuitabilityClassifier`]: soil/environment random forest loaded from a JSON export

pub mod forest;
pub mod remote;

pub use forest::ForestSuitabilityClassifier;
pub use remote::RemoteDiseaseClassifier;

use serde::Serialize;
use tmt_common::classes::{class_label, CLASS_COUNT};
use tmt_common::soil::{SoilReading, FEATURE_COUNT};
use tmt_common::{Error, Result};

use crate::preprocess::LeafTensor;

/// Leaf disease image classifier
#[async_trait::async_trait]
pub trait DiseaseClassifier: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// One probability per disease class, in catalogue order
    async fn predict(&self, image: &LeafTensor) -> Result<Vec<f32>>;
}

/// Soil/environment suitability classifier
pub trait SuitabilityClassifier: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Class probabilities for one reading
    fn predict_proba(&self, features: &[f64; FEATURE_COUNT]) -> Result<Vec<f64>>;
}

/// Index and value of the largest probability
///
/// The first maximum wins on ties. NaN entries are never selected.
/// Returns `None` for an empty slice or one made only of NaN.
pub fn top_class<T>(probs: &[T]) -> Option<(usize, f64)>
where
    T: Copy + Into<f64>,
{
    let mut best: Option<(usize, f64)> = None;
    for (index, &p) in probs.iter().enumerate() {
        let p: f64 = p.into();
        if p.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if p <= current => {}
            _ => best = Some((index, p)),
        }
    }
    best
}

/// Top disease class for a leaf image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiseasePrediction {
    pub class_index: usize,
    pub label: &'static str,
    /// Probability of the top class
    pub confidence: f64,
}

/// Run the disease classifier and pick its top class
///
/// # Errors
/// `Error::Model` when the backend fails or returns a probability vector
/// that does not match the class catalogue
pub async fn classify_disease(
    classifier: &dyn DiseaseClassifier,
    image: &LeafTensor,
) -> Result<DiseasePrediction> {
    let probs = classifier.predict(image).await?;

    if probs.len() != CLASS_COUNT {
        return Err(Error::Model(format!(
            "{} returned {} probabilities, expected {}",
            classifier.name(),
            probs.len(),
            CLASS_COUNT
        )));
    }

    let (class_index, confidence) = top_class(&probs)
        .ok_or_else(|| Error::Model(format!("{} returned no usable probabilities", classifier.name())))?;

    let label = class_label(class_index)
        .ok_or_else(|| Error::Internal(format!("No label for class index {}", class_index)))?;

    Ok(DiseasePrediction {
        class_index,
        label,
        confidence,
    })
}

/// Suitability score for a soil reading: the top-class probability
pub fn suitability_score(
    classifier: &dyn SuitabilityClassifier,
    reading: &SoilReading,
) -> Result<f64> {
    let probs = classifier.predict_proba(&reading.features())?;

    top_class(&probs)
        .map(|(_, p)| p)
        .ok_or_else(|| Error::Model(format!("{} returned no usable probabilities", classifier.name())))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedDisease(Vec<f32>);

    #[async_trait::async_trait]
    impl DiseaseClassifier for FixedDisease {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn predict(&self, _image: &LeafTensor) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }
    }

    struct FixedSuitability(Vec<f64>);

    impl SuitabilityClassifier for FixedSuitability {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn predict_proba(&self, _features: &[f64; FEATURE_COUNT]) -> Result<Vec<f64>> {
            Ok(self.0.clone())
        }
    }

    fn blank_tensor() -> LeafTensor {
        LeafTensor {
            data: vec![0.0; 3],
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn test_top_class_first_maximum_wins() {
        assert_eq!(top_class(&[0.1f64, 0.4, 0.4, 0.1]), Some((1, 0.4)));
        assert_eq!(top_class::<f64>(&[]), None);
        assert_eq!(top_class(&[f64::NAN, 0.2]), Some((1, 0.2)));
        assert_eq!(top_class(&[f64::NAN]), None);
    }

    #[tokio::test]
    async fn test_classify_disease_picks_label() {
        let mut probs = vec![0.0f32; CLASS_COUNT];
        probs[14] = 0.75;
        probs[3] = 0.25;
        let classifier = FixedDisease(probs);

        let prediction = classify_disease(&classifier, &blank_tensor()).await.unwrap();
        assert_eq!(prediction.class_index, 14);
        assert_eq!(prediction.label, "Tomato_healthy");
        assert_eq!(prediction.confidence, 0.75);
    }

    #[tokio::test]
    async fn test_classify_disease_rejects_wrong_class_count() {
        let classifier = FixedDisease(vec![0.5, 0.5]);
        let err = classify_disease(&classifier, &blank_tensor()).await.unwrap_err();
        assert!(matches!(err, Error::Model(_)));
        assert!(err.to_string().contains("expected 15"));
    }

    #[test]
    fn test_suitability_score_is_max_probability() {
        let classifier = FixedSuitability(vec![0.1, 0.7, 0.2]);
        let score = suitability_score(&classifier, &SoilReading::default()).unwrap();
        assert_eq!(score, 0.7);
    }

    #[test]
    fn test_suitability_score_empty_output() {
        let classifier = FixedSuitability(vec![]);
        assert!(suitability_score(&classifier, &SoilReading::default()).is_err());
    }
}
