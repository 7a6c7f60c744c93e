//! Error types for artifact loading and request handling

use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading or applying a model artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scaler document {}: {source}", path.display())]
    ScalerFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid scaler parameters: {0}")]
    ScalerParameters(String),

    #[error("X has {actual} features, but the scaler is expecting {expected} features as input")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("model error: {0}")]
    Model(String),
}

/// Everything that can go wrong while serving one `/predict` request.
///
/// Each variant maps to exactly one HTTP status and error body; the mapping
/// lives in [`crate::http`].
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Models are not loaded. Check server logs.")]
    NotLoaded,

    #[error("Invalid JSON input")]
    MalformedBody,

    #[error("Missing feature in request: '{0}'")]
    MissingField(&'static str),

    #[error("All feature values must be numbers.")]
    InvalidValue,

    #[error("Failed to make prediction.")]
    Inference(#[source] ArtifactError),
}

impl PredictError {
    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            PredictError::NotLoaded => "not_loaded",
            PredictError::MalformedBody => "malformed_body",
            PredictError::MissingField(_) => "missing_field",
            PredictError::InvalidValue => "invalid_value",
            PredictError::Inference(_) => "inference_failure",
        }
    }

    /// Whether the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PredictError::MalformedBody | PredictError::MissingField(_) | PredictError::InvalidValue
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PredictError::MissingField("aqi_avg").to_string(),
            "Missing feature in request: 'aqi_avg'"
        );
        assert_eq!(
            PredictError::InvalidValue.to_string(),
            "All feature values must be numbers."
        );
        assert_eq!(
            PredictError::NotLoaded.to_string(),
            "Models are not loaded. Check server logs."
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(PredictError::MalformedBody.is_client_error());
        assert!(PredictError::InvalidValue.is_client_error());
        assert!(!PredictError::NotLoaded.is_client_error());
        assert!(!PredictError::Inference(ArtifactError::Model("boom".into())).is_client_error());
    }
}
