//! Artifact loader for the scaler and the ONNX model

use crate::error::ArtifactError;
use crate::feature_contract::FEATURE_NAMES;
use crate::models::inference::RatingModel;
use crate::models::onnx::OnnxModel;
use crate::models::scaler::FeatureScaler;
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::info;

/// Scaler and model loaded together at startup
pub struct LoadedArtifacts {
    pub scaler: FeatureScaler,
    pub model: Box<dyn RatingModel>,
}

/// Loader for the startup artifacts
pub struct ArtifactLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ArtifactLoader {
    /// Create a new loader with default settings (1 thread)
    pub fn new() -> Self {
        Self::with_threads(1)
    }

    /// Create a new loader with specified number of ONNX threads
    pub fn with_threads(onnx_threads: usize) -> Self {
        Self {
            onnx_threads: onnx_threads.max(1),
        }
    }

    /// Load both artifacts. Either one failing fails the whole load.
    pub fn load_all(
        &self,
        scaler_path: impl AsRef<Path>,
        model_path: impl AsRef<Path>,
    ) -> Result<LoadedArtifacts, ArtifactError> {
        let scaler = self.load_scaler(scaler_path)?;
        let model = self.load_model(model_path)?;

        Ok(LoadedArtifacts {
            scaler,
            model: Box::new(model),
        })
    }

    /// Load and validate the scaler document
    pub fn load_scaler<P: AsRef<Path>>(&self, path: P) -> Result<FeatureScaler, ArtifactError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ArtifactError::NotFound(path.to_path_buf()));
        }

        info!(path = %path.display(), "Loading feature scaler");

        let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scaler = FeatureScaler::from_slice(&bytes).map_err(|source| {
            ArtifactError::ScalerFormat {
                path: path.to_path_buf(),
                source,
            }
        })?;
        scaler.validate(&FEATURE_NAMES)?;

        info!(
            kind = scaler.kind(),
            features = scaler.n_features(),
            "Scaler loaded successfully"
        );

        Ok(scaler)
    }

    /// Load the ONNX regression model
    pub fn load_model<P: AsRef<Path>>(&self, path: P) -> Result<OnnxModel, ArtifactError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ArtifactError::NotFound(path.to_path_buf()));
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());

        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()
            .map_err(|e| load_error(path, e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| load_error(path, e))?
            .with_intra_threads(self.onnx_threads)
            .map_err(|e| load_error(path, e))?
            .commit_from_file(path)
            .map_err(|e| load_error(path, e))?;

        let model = OnnxModel::new(name, session);

        info!(
            model = %model.name(),
            input = %model.input_name(),
            output = %model.output_name(),
            "Model loaded successfully"
        );

        Ok(model)
    }
}

fn load_error(path: &Path, e: impl std::fmt::Display) -> ArtifactError {
    ArtifactError::Model(format!("failed to load model from {}: {}", path.display(), e))
}

impl Default for ArtifactLoader {
    fn default() -> Self {
        Self::new()
    }
}
