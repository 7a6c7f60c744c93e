//! Test Prediction Client
//!
//! Generates random machine telemetry and posts it to a running rating
//! prediction API for smoke and load testing.

use rand::Rng;
use rating_prediction_api::{MachineTelemetry, FEATURE_NAMES};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{info, warn};

/// Telemetry generator for testing
struct TelemetryGenerator {
    rng: rand::rngs::ThreadRng,
}

impl TelemetryGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }

    /// Generate telemetry for a machine in normal condition
    fn generate_healthy(&mut self) -> MachineTelemetry {
        let total_current_assets = self.rng.gen_range(1..20) as f64;

        MachineTelemetry {
            total_overall_assets_rented: total_current_assets + self.rng.gen_range(0..80) as f64,
            total_current_assets,
            distance_per_day: self.rng.gen_range(5.0..120.0),
            engine_temp_avg: self.rng.gen_range(75.0..95.0),
            coolant_temp_avg: self.rng.gen_range(70.0..90.0),
            oil_pressure_avg: self.rng.gen_range(30.0..60.0),
            battery_voltage_avg: self.rng.gen_range(12.2..14.4),
            fuel_level_least: self.rng.gen_range(15.0..60.0),
            fuel_consumption_avg: self.rng.gen_range(5.0..20.0),
            efficiency_avg: self.rng.gen_range(70.0..98.0),
            cycle_counts_per_day: self.rng.gen_range(20..200) as f64,
            env_temp_avg: self.rng.gen_range(5.0..35.0),
            humidity_avg: self.rng.gen_range(20.0..80.0),
            aqi_avg: self.rng.gen_range(20.0..150.0),
            shock_avg: self.rng.gen_range(0.1..2.0),
            tilt_sensor_avg: self.rng.gen_range(0.0..10.0),
            overload_per_month: self.rng.gen_range(0..3) as f64,
        }
    }

    /// Generate telemetry for a machine being worked hard
    fn generate_strained(&mut self) -> MachineTelemetry {
        let mut telemetry = self.generate_healthy();
        telemetry.engine_temp_avg = self.rng.gen_range(100.0..125.0); // Running hot
        telemetry.oil_pressure_avg = self.rng.gen_range(10.0..25.0); // Low pressure
        telemetry.fuel_level_least = self.rng.gen_range(0.0..10.0);
        telemetry.efficiency_avg = self.rng.gen_range(40.0..65.0);
        telemetry.shock_avg = self.rng.gen_range(3.0..8.0);
        telemetry.overload_per_month = self.rng.gen_range(5..20) as f64;
        telemetry
    }

    /// Turn telemetry into a payload, sometimes breaking it on purpose
    fn to_payload(&mut self, telemetry: &MachineTelemetry, invalid_rate: f64) -> anyhow::Result<Value> {
        let mut payload: Map<String, Value> = match serde_json::to_value(telemetry)? {
            Value::Object(map) => map,
            _ => anyhow::bail!("telemetry did not serialize to an object"),
        };

        if self.rng.gen_bool(invalid_rate) {
            let field = FEATURE_NAMES[self.rng.gen_range(0..FEATURE_NAMES.len())];
            if self.rng.gen_bool(0.5) {
                payload.remove(field);
            } else {
                payload.insert(field.to_string(), Value::String("n/a".to_string()));
            }
        }

        Ok(Value::Object(payload))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("test_client=info".parse()?),
        )
        .init();

    info!("Starting Test Prediction Client");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let base_url = args.get(1).map(|s| s.as_str()).unwrap_or("http://localhost:5000");
    let count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);
    let delay_ms: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(100);
    let strained_rate: f64 = args.get(4).and_then(|s| s.parse::<f64>().ok()).unwrap_or(0.2).clamp(0.0, 1.0);
    let invalid_rate: f64 = args.get(5).and_then(|s| s.parse::<f64>().ok()).unwrap_or(0.05).clamp(0.0, 1.0);

    info!(
        base_url = %base_url,
        count = count,
        delay_ms = delay_ms,
        strained_rate = strained_rate,
        invalid_rate = invalid_rate,
        "Configuration loaded"
    );

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    // Probe the status page
    match client.get(base_url).send().await {
        Ok(response) if response.status().is_success() => {
            info!(status = %response.status(), "Server is up");
        }
        Ok(response) => {
            warn!(status = %response.status(), "Unexpected status page response. Running in dry-run mode.");
            return run_dry_mode(count, delay_ms, strained_rate, invalid_rate).await;
        }
        Err(e) => {
            warn!(error = %e, "Failed to reach server. Running in dry-run mode.");
            return run_dry_mode(count, delay_ms, strained_rate, invalid_rate).await;
        }
    }

    let predict_url = format!("{}/predict", base_url.trim_end_matches('/'));
    let mut generator = TelemetryGenerator::new();
    let mut rng = rand::thread_rng();

    let mut succeeded = 0u64;
    let mut rejected = 0u64;
    let mut failed = 0u64;
    let mut rating_sum = 0.0;

    info!("Starting to send {} prediction requests...", count);

    for i in 0..count {
        let telemetry = if rng.gen_bool(strained_rate) {
            generator.generate_strained()
        } else {
            generator.generate_healthy()
        };
        let payload = generator.to_payload(&telemetry, invalid_rate)?;

        match client.post(&predict_url).json(&payload).send().await {
            Ok(response) => {
                let status = response.status();
                let body: Value = response.json::<Value>().await.unwrap_or(Value::Null);

                if status.is_success() {
                    succeeded += 1;
                    if let Some(rating) = body["predicted_user_rating"].as_f64() {
                        rating_sum += rating;
                    }
                } else if status.is_client_error() {
                    rejected += 1;
                    info!(status = %status, error = %body["error"], "Request rejected");
                } else {
                    failed += 1;
                    warn!(status = %status, body = %body, "Request failed");
                }
            }
            Err(e) => {
                failed += 1;
                warn!(error = %e, "Request could not be sent");
            }
        }

        if (i + 1) % 10 == 0 {
            info!(
                "Sent {}/{} requests ({} succeeded, {} rejected, {} failed)",
                i + 1,
                count,
                succeeded,
                rejected,
                failed
            );
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    let mean_rating = if succeeded > 0 {
        rating_sum / succeeded as f64
    } else {
        0.0
    };
    info!(
        "Completed! {} requests: {} succeeded (mean rating {:.2}), {} rejected, {} failed",
        count, succeeded, mean_rating, rejected, failed
    );

    Ok(())
}

async fn run_dry_mode(
    count: u64,
    delay_ms: u64,
    strained_rate: f64,
    invalid_rate: f64,
) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no server connection)");

    let mut generator = TelemetryGenerator::new();
    let mut rng = rand::thread_rng();

    for i in 0..count {
        let telemetry = if rng.gen_bool(strained_rate) {
            generator.generate_strained()
        } else {
            generator.generate_healthy()
        };
        let payload = generator.to_payload(&telemetry, invalid_rate)?;

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample payload {}:\n{}", i + 1, serde_json::to_string_pretty(&payload)?);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
