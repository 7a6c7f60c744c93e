//! Type definitions for the rating prediction API

pub mod response;
pub mod telemetry;

pub use response::{ErrorResponse, PredictionResponse};
pub use telemetry::MachineTelemetry;
