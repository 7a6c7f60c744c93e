//! Rating Prediction API - Main Entry Point
//!
//! Loads the scaler and model, then serves predictions over HTTP until Ctrl-C.
//! If the artifacts cannot be loaded the server still starts and answers
//! every `/predict` call with a "not loaded" error.

use anyhow::{Context, Result};
use rating_prediction_api::{
    config::{AppConfig, LogFormat},
    http::{self, ApiState},
    metrics::MetricsReporter,
    models::{inference::RatingPredictor, loader::ArtifactLoader},
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    init_logging(&config)?;
    info!("Starting Rating Prediction API {}", env!("CARGO_PKG_VERSION"));
    info!(
        scaler = %config.artifacts.scaler_path,
        model = %config.artifacts.model_path,
        "Configuration loaded successfully"
    );

    // Load artifacts; failure leaves the service running but not ready
    let loader = ArtifactLoader::with_threads(config.artifacts.onnx_threads);
    let artifacts = match loader.load_all(&config.artifacts.scaler_path, &config.artifacts.model_path) {
        Ok(artifacts) => {
            info!("Models loaded successfully.");
            Some(artifacts)
        }
        Err(e) => {
            error!(error = %e, "Error loading model files");
            warn!("Serving in degraded mode: /predict will fail until restart");
            None
        }
    };

    let state = ApiState::new(RatingPredictor::new(artifacts));
    info!(
        ready = state.predictor.is_ready(),
        model = state.predictor.model_name().unwrap_or("none"),
        "Predictor initialized"
    );

    // Start metrics reporter
    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(state.metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(reporter.start());
    } else {
        info!("Metrics reporting disabled.");
    }

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    let metrics = state.metrics.clone();
    http::serve(listener, state, shutdown_signal()).await?;

    info!("Server shutting down...");
    metrics.print_summary();

    Ok(())
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.logging.level)
            .with_context(|| format!("Invalid log level '{}'", config.logging.level))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
