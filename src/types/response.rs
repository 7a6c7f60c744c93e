//! Response bodies returned by the HTTP surface

use serde::{Deserialize, Serialize};

/// Message attached to every successful prediction.
pub const SUCCESS_MESSAGE: &str = "Prediction successful";

/// Body of a successful `/predict` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub message: String,
    /// Predicted rating rounded to two decimal places
    pub predicted_user_rating: f64,
}

impl PredictionResponse {
    pub fn new(predicted_user_rating: f64) -> Self {
        Self {
            message: SUCCESS_MESSAGE.to_string(),
            predicted_user_rating,
        }
    }
}

/// Body of every failed `/predict` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Underlying failure text, only set for inference failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
