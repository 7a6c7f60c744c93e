//! Request metrics and periodic summaries for the prediction endpoint.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Window sizes for the latency and prediction samples
const LATENCY_WINDOW: usize = 10_000;
const PREDICTION_WINDOW: usize = 1_000;

/// Metrics collector for `/predict` traffic
pub struct PredictionMetrics {
    /// Total requests handled
    pub requests_total: AtomicU64,
    /// Requests that produced a prediction
    pub predictions_succeeded: AtomicU64,
    /// Failed requests by error kind
    failures_by_kind: RwLock<HashMap<String, u64>>,
    /// Request latencies (in microseconds)
    latencies: RwLock<Vec<u64>>,
    /// Recent predicted ratings
    predictions: RwLock<Vec<f64>>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl PredictionMetrics {
    pub fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            predictions_succeeded: AtomicU64::new(0),
            failures_by_kind: RwLock::new(HashMap::new()),
            latencies: RwLock::new(Vec::with_capacity(1000)),
            predictions: RwLock::new(Vec::with_capacity(PREDICTION_WINDOW)),
            start_time: Instant::now(),
        }
    }

    /// Record a successful prediction
    pub fn record_success(&self, latency: Duration, rating: f64) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.predictions_succeeded.fetch_add(1, Ordering::Relaxed);
        self.record_latency(latency);

        if let Ok(mut predictions) = self.predictions.write() {
            predictions.push(rating);
            if predictions.len() > PREDICTION_WINDOW {
                predictions.drain(0..PREDICTION_WINDOW / 2);
            }
        }
    }

    /// Record a failed request
    pub fn record_failure(&self, latency: Duration, kind: &str) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.record_latency(latency);

        if let Ok(mut by_kind) = self.failures_by_kind.write() {
            *by_kind.entry(kind.to_string()).or_insert(0) += 1;
        }
    }

    fn record_latency(&self, latency: Duration) {
        if let Ok(mut times) = self.latencies.write() {
            times.push(latency.as_micros() as u64);
            if times.len() > LATENCY_WINDOW {
                times.drain(0..LATENCY_WINDOW / 2);
            }
        }
    }

    /// Get latency statistics over the current window
    pub fn get_latency_stats(&self) -> LatencyStats {
        let mut sorted = match self.latencies.read() {
            Ok(times) if !times.is_empty() => times.clone(),
            _ => return LatencyStats::default(),
        };
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: sorted[count - 1],
        }
    }

    /// Mean of recent predictions, if any were made
    pub fn get_mean_prediction(&self) -> Option<f64> {
        let predictions = self.predictions.read().ok()?;
        if predictions.is_empty() {
            return None;
        }
        Some(predictions.iter().sum::<f64>() / predictions.len() as f64)
    }

    /// Get current throughput (requests per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.requests_total.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get failures by error kind
    pub fn get_failures_by_kind(&self) -> HashMap<String, u64> {
        self.failures_by_kind
            .read()
            .map(|by_kind| by_kind.clone())
            .unwrap_or_default()
    }

    /// Log summary statistics
    pub fn print_summary(&self) {
        let total = self.requests_total.load(Ordering::Relaxed);
        let succeeded = self.predictions_succeeded.load(Ordering::Relaxed);
        let success_rate = if total > 0 {
            (succeeded as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        let latency = self.get_latency_stats();
        let throughput = self.get_throughput();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║            RATING PREDICTION API - METRICS SUMMARY           ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Requests Handled:       {:>8}  │  Throughput: {:>6.1} req/s ║",
            total, throughput
        );
        info!(
            "║ Predictions Served:     {:>8}  │  Success:    {:>6.1}%     ║",
            succeeded, success_rate
        );
        info!(
            "║ Latency (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5} max={:>5} ║",
            latency.mean_us, latency.p50_us, latency.p95_us, latency.p99_us, latency.max_us
        );
        if let Some(mean) = self.get_mean_prediction() {
            info!("║ Mean Predicted Rating: {:>6.2}                                ║", mean);
        }

        let failures = self.get_failures_by_kind();
        if !failures.is_empty() {
            info!("╠══════════════════════════════════════════════════════════════╣");
            info!("║ Failures by Kind:                                            ║");
            for (kind, count) in &failures {
                info!("║   {:18}: {:>6}                                 ║", kind, count);
            }
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for PredictionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Request latency statistics
#[derive(Debug, Default)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Periodic metrics reporter
pub struct MetricsReporter {
    metrics: Arc<PredictionMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<PredictionMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs.max(1)));
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = PredictionMetrics::new();

        metrics.record_success(Duration::from_micros(100), 3.5);
        metrics.record_success(Duration::from_micros(300), 4.5);
        metrics.record_failure(Duration::from_micros(20), "missing_field");
        metrics.record_failure(Duration::from_micros(20), "missing_field");
        metrics.record_failure(Duration::from_micros(10), "not_loaded");

        assert_eq!(metrics.requests_total.load(Ordering::Relaxed), 5);
        assert_eq!(metrics.predictions_succeeded.load(Ordering::Relaxed), 2);

        let failures = metrics.get_failures_by_kind();
        assert_eq!(failures.get("missing_field"), Some(&2));
        assert_eq!(failures.get("not_loaded"), Some(&1));
        assert_eq!(metrics.get_mean_prediction(), Some(4.0));
    }

    #[test]
    fn test_latency_stats() {
        let metrics = PredictionMetrics::new();
        for us in 1..=100 {
            metrics.record_success(Duration::from_micros(us), 1.0);
        }

        let stats = metrics.get_latency_stats();
        assert_eq!(stats.count, 100);
        assert_eq!(stats.max_us, 100);
        assert_eq!(stats.p50_us, 51);
        assert_eq!(stats.mean_us, 50);
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = PredictionMetrics::new();

        assert_eq!(metrics.get_latency_stats().count, 0);
        assert_eq!(metrics.get_mean_prediction(), None);
        assert!(metrics.get_failures_by_kind().is_empty());
    }
}
