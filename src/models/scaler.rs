//! Pre-fitted feature scaler
//!
//! The training pipeline exports the fitted scikit-learn scaler as a small
//! JSON document:
//!
//! ```json
//! {"kind": "standard", "mean": [...], "scale": [...], "feature_names": [...]}
//! {"kind": "min_max", "min": [...], "scale": [...]}
//! ```
//!
//! `feature_names` is optional. When present it is checked against the
//! feature contract at load time.

use crate::error::ArtifactError;
use serde::{Deserialize, Serialize};

/// Fitted transform parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerTransform {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

/// Deterministic transform normalising raw features into the model's input space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    #[serde(flatten)]
    transform: ScalerTransform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    feature_names: Option<Vec<String>>,
}

impl FeatureScaler {
    /// Standard scaler from fitted means and scales.
    pub fn standard(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ArtifactError> {
        let scaler = Self {
            transform: ScalerTransform::Standard { mean, scale },
            feature_names: None,
        };
        scaler.check_parameters()?;
        Ok(scaler)
    }

    /// Min-max scaler from fitted `min_` and `scale_` attributes.
    pub fn min_max(min: Vec<f64>, scale: Vec<f64>) -> Result<Self, ArtifactError> {
        let scaler = Self {
            transform: ScalerTransform::MinMax { min, scale },
            feature_names: None,
        };
        scaler.check_parameters()?;
        Ok(scaler)
    }

    /// Parse a scaler document without validating it.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Check internal consistency and, if the document names its features,
    /// that they match `expected_names` exactly.
    pub fn validate(&self, expected_names: &[&str]) -> Result<(), ArtifactError> {
        self.check_parameters()?;

        if let Some(names) = &self.feature_names {
            if names.len() != self.n_features() {
                return Err(ArtifactError::ScalerParameters(format!(
                    "{} feature names for {} fitted features",
                    names.len(),
                    self.n_features()
                )));
            }

            let matches = names.len() == expected_names.len()
                && names.iter().zip(expected_names).all(|(a, b)| a == b);
            if !matches {
                return Err(ArtifactError::ScalerParameters(format!(
                    "fitted feature names {:?} do not match expected {:?}",
                    names, expected_names
                )));
            }
        }

        Ok(())
    }

    fn check_parameters(&self) -> Result<(), ArtifactError> {
        let (offset, scale) = match &self.transform {
            ScalerTransform::Standard { mean, scale } => (mean, scale),
            ScalerTransform::MinMax { min, scale } => (min, scale),
        };

        if scale.is_empty() {
            return Err(ArtifactError::ScalerParameters(
                "scaler has no fitted features".to_string(),
            ));
        }
        if offset.len() != scale.len() {
            return Err(ArtifactError::ScalerParameters(format!(
                "parameter lengths differ ({} vs {})",
                offset.len(),
                scale.len()
            )));
        }
        if offset.iter().chain(scale).any(|v| !v.is_finite()) {
            return Err(ArtifactError::ScalerParameters(
                "parameters must be finite".to_string(),
            ));
        }
        // scikit-learn replaces zero variance with a unit scale when fitting
        if matches!(self.transform, ScalerTransform::Standard { .. }) && scale.contains(&0.0) {
            return Err(ArtifactError::ScalerParameters(
                "standard scale contains zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Short name of the fitted transform.
    pub fn kind(&self) -> &'static str {
        match self.transform {
            ScalerTransform::Standard { .. } => "standard",
            ScalerTransform::MinMax { .. } => "min_max",
        }
    }

    /// Number of features the scaler was fitted on.
    pub fn n_features(&self) -> usize {
        match &self.transform {
            ScalerTransform::Standard { scale, .. } | ScalerTransform::MinMax { scale, .. } => {
                scale.len()
            }
        }
    }

    /// Apply the fitted transform to one feature vector.
    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ArtifactError> {
        if features.len() != self.n_features() {
            return Err(ArtifactError::ShapeMismatch {
                expected: self.n_features(),
                actual: features.len(),
            });
        }

        let scaled = match &self.transform {
            ScalerTransform::Standard { mean, scale } => features
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(x, (m, s))| (x - m) / s)
                .collect(),
            ScalerTransform::MinMax { min, scale } => features
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(x, (m, s))| x * s + m)
                .collect(),
        };

        Ok(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_transform() {
        let scaler = FeatureScaler::standard(vec![10.0, 0.0], vec![2.0, 0.5]).unwrap();
        let scaled = scaler.transform(&[14.0, 1.0]).unwrap();

        assert_eq!(scaled, vec![2.0, 2.0]);
        assert_eq!(scaler.kind(), "standard");
    }

    #[test]
    fn test_min_max_transform() {
        let scaler = FeatureScaler::min_max(vec![-1.0, 0.0], vec![0.1, 2.0]).unwrap();
        let scaled = scaler.transform(&[20.0, 0.25]).unwrap();

        assert!((scaled[0] - 1.0).abs() < 1e-12);
        assert!((scaled[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_shape_mismatch() {
        let scaler = FeatureScaler::standard(vec![0.0; 3], vec![1.0; 3]).unwrap();
        let err = scaler.transform(&[1.0, 2.0]).unwrap_err();

        assert!(matches!(
            err,
            ArtifactError::ShapeMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert!(err.to_string().contains("expecting 3 features"));
    }

    #[test]
    fn test_parse_document() {
        let doc = br#"{"kind": "standard", "mean": [1.0, 2.0], "scale": [1.0, 4.0], "feature_names": ["a", "b"]}"#;
        let scaler = FeatureScaler::from_slice(doc).unwrap();

        assert_eq!(scaler.n_features(), 2);
        assert!(scaler.validate(&["a", "b"]).is_ok());
        assert!(scaler.validate(&["b", "a"]).is_err());
    }

    #[test]
    fn test_parse_min_max_document() {
        let doc = br#"{"kind": "min_max", "min": [0.0], "scale": [0.5]}"#;
        let scaler = FeatureScaler::from_slice(doc).unwrap();

        assert_eq!(scaler.kind(), "min_max");
        assert!(scaler.validate(&["anything"]).is_ok());
    }

    #[test]
    fn test_rejects_inconsistent_parameters() {
        assert!(FeatureScaler::standard(vec![0.0; 2], vec![1.0; 3]).is_err());
        assert!(FeatureScaler::standard(vec![], vec![]).is_err());
        assert!(FeatureScaler::standard(vec![0.0], vec![0.0]).is_err());
        assert!(FeatureScaler::min_max(vec![f64::NAN], vec![1.0]).is_err());
    }

    #[test]
    fn test_rejects_unknown_kind() {
        let doc = br#"{"kind": "robust", "center": [0.0], "scale": [1.0]}"#;
        assert!(FeatureScaler::from_slice(doc).is_err());
    }

    #[test]
    fn test_feature_names_length_checked() {
        let doc = br#"{"kind": "standard", "mean": [0.0, 0.0], "scale": [1.0, 1.0], "feature_names": ["a"]}"#;
        let scaler = FeatureScaler::from_slice(doc).unwrap();

        assert!(scaler.validate(&["a"]).is_err());
    }
}
