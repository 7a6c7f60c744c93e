//! Feature contract between the `/predict` payload and the model input.
//!
//! The scaler and model were fitted on a vector of 17 telemetry features in a
//! fixed order. Requests arrive as JSON objects whose key order carries no
//! meaning, so the contract alone decides where each value lands.

use crate::error::PredictError;
use crate::types::telemetry::MachineTelemetry;
use serde_json::{Map, Value};

/// Number of features the model expects.
pub const FEATURE_COUNT: usize = 17;

/// Feature names in the order the training pipeline fitted them.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "total_overall_assets_rented",
    "total_current_assets",
    "distance_per_day",
    "engine_temp_avg",
    "coolant_temp_avg",
    "oil_pressure_avg",
    "battery_voltage_avg",
    "fuel_level_least",
    "fuel_consumption_avg",
    "efficiency_avg",
    "cycle_counts_per_day",
    "env_temp_avg",
    "humidity_avg",
    "aqi_avg",
    "shock_avg",
    "tilt_sensor_avg",
    "overload_per_month",
];

/// Validates request payloads and turns them into typed telemetry records.
pub struct FeatureContract;

impl FeatureContract {
    /// Create a new feature contract.
    pub fn new() -> Self {
        Self
    }

    /// Decode a raw request body.
    ///
    /// The body must be a non-empty JSON object; anything else is reported as
    /// [`PredictError::MalformedBody`].
    pub fn decode(&self, body: &[u8]) -> Result<MachineTelemetry, PredictError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(PredictError::MalformedBody);
        }

        let value: Value =
            serde_json::from_slice(body).map_err(|_| PredictError::MalformedBody)?;

        match value {
            Value::Object(payload) if !payload.is_empty() => self.extract(&payload),
            _ => Err(PredictError::MalformedBody),
        }
    }

    /// Extract all contract features from a parsed payload.
    ///
    /// Fields are visited in contract order, so the first missing field in
    /// that order is the one reported. Keys outside the contract are ignored.
    pub fn extract(&self, payload: &Map<String, Value>) -> Result<MachineTelemetry, PredictError> {
        let mut values = [0.0; FEATURE_COUNT];

        for (slot, name) in values.iter_mut().zip(FEATURE_NAMES) {
            let raw = payload.get(name).ok_or(PredictError::MissingField(name))?;
            *slot = coerce_number(raw).ok_or(PredictError::InvalidValue)?;
        }

        Ok(MachineTelemetry::from_ordered(values))
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    /// Get feature names in model order.
    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }
}

impl Default for FeatureContract {
    fn default() -> Self {
        Self::new()
    }
}

/// Coerce a JSON value to a finite float.
///
/// Numbers pass through, numeric strings are parsed and booleans count as
/// 1 and 0. Everything else, including strings spelling NaN or infinity, is
/// rejected.
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };

    number.is_finite().then_some(number)
}
