//! Model artifacts and rating inference

pub mod inference;
pub mod loader;
pub mod onnx;
pub mod scaler;

pub use inference::{RatingModel, RatingPredictor};
pub use loader::{ArtifactLoader, LoadedArtifacts};
pub use onnx::OnnxModel;
pub use scaler::FeatureScaler;
