//! Machine telemetry record submitted for rating prediction

use serde::{Deserialize, Serialize};

/// Aggregated telemetry for one rental machine.
///
/// Field names are the wire keys of the `/predict` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineTelemetry {
    /// Total number of assets ever rented by the customer
    pub total_overall_assets_rented: f64,

    /// Assets currently on rent
    pub total_current_assets: f64,

    /// Average distance covered per day
    pub distance_per_day: f64,

    /// Average engine temperature
    pub engine_temp_avg: f64,

    /// Average coolant temperature
    pub coolant_temp_avg: f64,

    /// Average oil pressure
    pub oil_pressure_avg: f64,

    /// Average battery voltage
    pub battery_voltage_avg: f64,

    /// Lowest observed fuel level
    pub fuel_level_least: f64,

    /// Average fuel consumption
    pub fuel_consumption_avg: f64,

    /// Average operating efficiency
    pub efficiency_avg: f64,

    /// Work cycles per day
    pub cycle_counts_per_day: f64,

    /// Average ambient temperature
    pub env_temp_avg: f64,

    /// Average humidity
    pub humidity_avg: f64,

    /// Average air quality index
    pub aqi_avg: f64,

    /// Average shock sensor reading
    pub shock_avg: f64,

    /// Average tilt sensor reading
    pub tilt_sensor_avg: f64,

    /// Overload events per month
    pub overload_per_month: f64,
}

impl MachineTelemetry {
    /// Build a record from values already in feature-contract order.
    pub fn from_ordered(values: [f64; 17]) -> Self {
        let [total_overall_assets_rented, total_current_assets, distance_per_day, engine_temp_avg, coolant_temp_avg, oil_pressure_avg, battery_voltage_avg, fuel_level_least, fuel_consumption_avg, efficiency_avg, cycle_counts_per_day, env_temp_avg, humidity_avg, aqi_avg, shock_avg, tilt_sensor_avg, overload_per_month] =
            values;

        Self {
            total_overall_assets_rented,
            total_current_assets,
            distance_per_day,
            engine_temp_avg,
            coolant_temp_avg,
            oil_pressure_avg,
            battery_voltage_avg,
            fuel_level_least,
            fuel_consumption_avg,
            efficiency_avg,
            cycle_counts_per_day,
            env_temp_avg,
            humidity_avg,
            aqi_avg,
            shock_avg,
            tilt_sensor_avg,
            overload_per_month,
        }
    }

    /// Feature vector in the order the scaler and model were fitted with.
    pub fn to_vector(&self) -> Vec<f64> {
        vec![
            self.total_overall_assets_rented,
            self.total_current_assets,
            self.distance_per_day,
            self.engine_temp_avg,
            self.coolant_temp_avg,
            self.oil_pressure_avg,
            self.battery_voltage_avg,
            self.fuel_level_least,
            self.fuel_consumption_avg,
            self.efficiency_avg,
            self.cycle_counts_per_day,
            self.env_temp_avg,
            self.humidity_avg,
            self.aqi_avg,
            self.shock_avg,
            self.tilt_sensor_avg,
            self.overload_per_month,
        ]
    }
}
