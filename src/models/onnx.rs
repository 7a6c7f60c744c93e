//! ONNX Runtime backed regression model

use crate::error::ArtifactError;
use crate::models::inference::RatingModel;
use ort::session::Session;
use ort::value::Tensor;
use std::sync::Mutex;
use tracing::debug;

/// Loaded ONNX regression model with metadata
pub struct OnnxModel {
    /// Model name
    name: String,
    /// ONNX Runtime session; running it needs exclusive access
    session: Mutex<Session>,
    /// Input name for the model
    input_name: String,
    /// Output name holding the prediction
    output_name: String,
}

impl OnnxModel {
    pub(crate) fn new(name: String, session: Session) -> Self {
        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        // skl2onnx names regressor outputs "variable"
        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("variable") || o.name.contains("output"))
            .or_else(|| session.outputs.first())
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "variable".to_string());

        Self {
            name,
            session: Mutex::new(session),
            input_name,
            output_name,
        }
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }
}

impl RatingModel for OnnxModel {
    fn predict(&self, features: &[f32]) -> Result<f64, ArtifactError> {
        // Prepare input tensor - shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))
            .map_err(|e| ArtifactError::Model(format!("failed to create input tensor: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| ArtifactError::Model(format!("session lock poisoned: {}", e)))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_tensor])
            .map_err(|e| ArtifactError::Model(e.to_string()))?;

        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            ArtifactError::Model(format!("model produced no output named {}", self.output_name))
        })?;

        // Regressors export float32 by default, double when converted with it
        let prediction = if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
            data.first().map(|&v| v as f64)
        } else if let Ok((_, data)) = output.try_extract_tensor::<f64>() {
            data.first().copied()
        } else {
            return Err(ArtifactError::Model(format!(
                "output {} is not a numeric tensor",
                self.output_name
            )));
        };

        let prediction = prediction
            .ok_or_else(|| ArtifactError::Model("model returned an empty output".to_string()))?;

        debug!(model = %self.name, prediction = prediction, "Extracted from tensor");

        Ok(prediction)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
