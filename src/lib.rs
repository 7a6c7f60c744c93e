//! Rating Prediction API Library
//!
//! Serves a pre-trained regression model that predicts a user rating from
//! 17 machine telemetry features. A fitted scaler and an ONNX model are
//! loaded once at startup and shared read-only by every request.

pub mod config;
pub mod error;
pub mod feature_contract;
pub mod http;
pub mod metrics;
pub mod models;
pub mod types;

pub use config::AppConfig;
pub use error::{ArtifactError, PredictError};
pub use feature_contract::{FeatureContract, FEATURE_NAMES};
pub use models::inference::RatingPredictor;
pub use models::loader::ArtifactLoader;
pub use types::{telemetry::MachineTelemetry, ErrorResponse, PredictionResponse};
