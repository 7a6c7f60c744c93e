//! Rating inference engine: validate, order, scale, predict, round

use crate::error::{ArtifactError, PredictError};
use crate::feature_contract::FeatureContract;
use crate::models::loader::LoadedArtifacts;
use crate::types::telemetry::MachineTelemetry;
use tracing::{debug, error};

/// A pre-fitted regression model mapping a scaled feature vector to a rating.
pub trait RatingModel: Send + Sync {
    /// Predict a single rating from one scaled feature vector.
    fn predict(&self, features: &[f32]) -> Result<f64, ArtifactError>;

    /// Model name for logs.
    fn name(&self) -> &str;
}

/// Round a prediction to two decimal places.
///
/// Rounds the exact binary value, ties to even, so `4.345` (stored just below
/// the tie) becomes `4.34` and `0.125` becomes `0.12`. Scaling by 100 first
/// would round twice and push such values up.
pub fn round_rating(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Inference engine shared by every request.
///
/// Holds the artifacts loaded at startup, or nothing if loading failed. In the
/// latter case every prediction is refused with [`PredictError::NotLoaded`].
pub struct RatingPredictor {
    contract: FeatureContract,
    artifacts: Option<LoadedArtifacts>,
}

impl RatingPredictor {
    /// Create a predictor over the artifacts loaded at startup.
    pub fn new(artifacts: Option<LoadedArtifacts>) -> Self {
        Self {
            contract: FeatureContract::new(),
            artifacts,
        }
    }

    /// Create a predictor that refuses every request.
    pub fn unloaded() -> Self {
        Self::new(None)
    }

    /// Whether the scaler and model are available.
    pub fn is_ready(&self) -> bool {
        self.artifacts.is_some()
    }

    /// Name of the loaded model, if any.
    pub fn model_name(&self) -> Option<&str> {
        self.artifacts.as_ref().map(|a| a.model.name())
    }

    /// Run the full pipeline on a raw request body.
    ///
    /// Readiness is checked before the body is looked at, so an unloaded
    /// service reports the same error whatever the payload.
    pub fn predict_body(&self, body: &[u8]) -> Result<f64, PredictError> {
        let artifacts = self.artifacts.as_ref().ok_or(PredictError::NotLoaded)?;
        let telemetry = self.contract.decode(body)?;
        Self::run(artifacts, &telemetry)
    }

    fn run(artifacts: &LoadedArtifacts, telemetry: &MachineTelemetry) -> Result<f64, PredictError> {
        let raw = telemetry.to_vector();

        let result = artifacts.scaler.transform(&raw).and_then(|scaled| {
            let input: Vec<f32> = scaled.iter().map(|&v| v as f32).collect();
            artifacts.model.predict(&input)
        });

        let prediction = match result {
            Ok(value) if value.is_finite() => value,
            Ok(value) => {
                error!(model = %artifacts.model.name(), value = value, "Model produced a non-finite prediction");
                return Err(PredictError::Inference(ArtifactError::Model(format!(
                    "model produced a non-finite prediction ({})",
                    value
                ))));
            }
            Err(e) => {
                error!(model = %artifacts.model.name(), error = %e, "Rating inference failed");
                return Err(PredictError::Inference(e));
            }
        };

        let rating = round_rating(prediction);
        debug!(
            model = %artifacts.model.name(),
            raw_prediction = prediction,
            rating = rating,
            "Rating inference complete"
        );

        Ok(rating)
    }
}
