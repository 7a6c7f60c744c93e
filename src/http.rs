//! HTTP surface: the status page and the `/predict` endpoint

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::error::PredictError;
use crate::metrics::PredictionMetrics;
use crate::models::inference::RatingPredictor;
use crate::types::response::{ErrorResponse, PredictionResponse};

const INDEX_HTML: &str =
    "<h1>Rating Prediction API</h1><p>Send a POST request to /predict to get a rating.</p>";

#[derive(Clone)]
pub struct ApiState {
    pub predictor: Arc<RatingPredictor>,
    pub metrics: Arc<PredictionMetrics>,
}

impl ApiState {
    pub fn new(predictor: RatingPredictor) -> Self {
        Self {
            predictor: Arc::new(predictor),
            metrics: Arc::new(PredictionMetrics::new()),
        }
    }
}

/// Build the application router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: ApiState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(address = %addr, "Listening for prediction requests");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn predict(State(state): State<ApiState>, body: Bytes) -> Response {
    let started = Instant::now();

    match state.predictor.predict_body(&body) {
        Ok(rating) => {
            state.metrics.record_success(started.elapsed(), rating);
            debug!(rating = rating, "Prediction served");
            (StatusCode::OK, Json(PredictionResponse::new(rating))).into_response()
        }
        Err(e) => {
            state.metrics.record_failure(started.elapsed(), e.kind());
            if e.is_client_error() {
                debug!(kind = e.kind(), error = %e, "Rejected prediction request");
            } else {
                warn!(kind = e.kind(), error = %e, "Prediction request failed");
            }
            e.into_response()
        }
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = match &self {
            PredictError::Inference(source) => {
                ErrorResponse::new(self.to_string()).with_details(source.to_string())
            }
            _ => ErrorResponse::new(self.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_contract::FEATURE_NAMES;
    use crate::models::inference::tests::{test_artifacts, valid_payload};
    use crate::models::loader::LoadedArtifacts;
    use crate::models::scaler::FeatureScaler;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use serde_json::{json, Map, Value};
    use std::sync::atomic::Ordering;
    use tower::ServiceExt;

    fn loaded_state() -> ApiState {
        ApiState::new(RatingPredictor::new(Some(test_artifacts())))
    }

    async fn send(state: ApiState, method: Method, uri: &str, body: Vec<u8>) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn post_predict(state: ApiState, body: Vec<u8>) -> (StatusCode, Value) {
        let (status, bytes) = send(state, Method::POST, "/predict", body).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn to_body(payload: &Map<String, Value>) -> Vec<u8> {
        serde_json::to_vec(payload).unwrap()
    }

    #[tokio::test]
    async fn test_valid_payload_predicts_two_decimals() {
        let state = loaded_state();
        let (status, json) = post_predict(state.clone(), to_body(&valid_payload())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Prediction successful");
        let rating = json["predicted_user_rating"].as_f64().unwrap();
        assert!(((rating * 100.0).round() - rating * 100.0).abs() < 1e-6);
        assert_eq!(state.metrics.predictions_succeeded.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_each_missing_field_is_named() {
        for name in FEATURE_NAMES {
            let mut payload = valid_payload();
            payload.remove(name);

            let (status, json) = post_predict(loaded_state(), to_body(&payload)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(
                json["error"],
                format!("Missing feature in request: '{}'", name)
            );
        }
    }

    #[tokio::test]
    async fn test_non_numeric_value_rejected() {
        let mut payload = valid_payload();
        payload.insert("fuel_level_least".to_string(), json!("abc"));

        let (status, json) = post_predict(loaded_state(), to_body(&payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "All feature values must be numbers.");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_null_value_rejected() {
        let mut payload = valid_payload();
        payload.insert("shock_avg".to_string(), Value::Null);

        let (status, json) = post_predict(loaded_state(), to_body(&payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "All feature values must be numbers.");
    }

    #[tokio::test]
    async fn test_invalid_json_rejected() {
        for body in [Vec::new(), b"not json".to_vec(), b"{}".to_vec()] {
            let (status, json) = post_predict(loaded_state(), body).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["error"], "Invalid JSON input");
        }
    }

    #[tokio::test]
    async fn test_unloaded_models_refuse_everything() {
        let state = ApiState::new(RatingPredictor::unloaded());

        for body in [to_body(&valid_payload()), Vec::new(), b"garbage".to_vec()] {
            let (status, json) = post_predict(state.clone(), body).await;

            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert!(json["error"]
                .as_str()
                .unwrap()
                .starts_with("Models are not loaded"));
        }
        assert_eq!(
            state.metrics.get_failures_by_kind().get("not_loaded"),
            Some(&3)
        );
    }

    #[tokio::test]
    async fn test_inference_failure_includes_details() {
        let artifacts = LoadedArtifacts {
            scaler: FeatureScaler::standard(vec![0.0; 4], vec![1.0; 4]).unwrap(),
            model: test_artifacts().model,
        };
        let state = ApiState::new(RatingPredictor::new(Some(artifacts)));

        let (status, json) = post_predict(state, to_body(&valid_payload())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Failed to make prediction.");
        assert!(json["details"].as_str().unwrap().contains("expecting 4 features"));
    }

    #[tokio::test]
    async fn test_key_order_does_not_matter() {
        let payload = valid_payload();
        let object_in = |names: Vec<&str>| {
            let fields: Vec<String> = names
                .iter()
                .map(|name| format!("\"{}\": {}", name, payload[*name]))
                .collect();
            format!("{{{}}}", fields.join(", ")).into_bytes()
        };

        let forward_body = object_in(FEATURE_NAMES.to_vec());
        let reversed_body = object_in(FEATURE_NAMES.iter().rev().copied().collect());
        assert_ne!(forward_body, reversed_body);

        let (_, a) = post_predict(loaded_state(), forward_body).await;
        let (_, b) = post_predict(loaded_state(), reversed_body).await;

        assert_eq!(a["predicted_user_rating"], b["predicted_user_rating"]);
    }

    #[tokio::test]
    async fn test_numeric_strings_and_extra_keys_accepted() {
        let numeric = valid_payload();
        let mut stringly = Map::new();
        for (key, value) in &numeric {
            stringly.insert(key.clone(), json!(value.as_f64().unwrap().to_string()));
        }
        stringly.insert("machine_id".to_string(), json!("EXC-42"));

        let (status, a) = post_predict(loaded_state(), to_body(&stringly)).await;
        let (_, b) = post_predict(loaded_state(), to_body(&numeric)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(a["predicted_user_rating"], b["predicted_user_rating"]);
    }

    #[tokio::test]
    async fn test_index_page() {
        for state in [loaded_state(), ApiState::new(RatingPredictor::unloaded())] {
            let (status, body) = send(state, Method::GET, "/", Vec::new()).await;

            assert_eq!(status, StatusCode::OK);
            assert!(String::from_utf8(body).unwrap().contains("Rating Prediction API"));
        }

        let (status, _) = send(loaded_state(), Method::HEAD, "/", Vec::new()).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_predict_requires_post() {
        let (status, _) = send(loaded_state(), Method::GET, "/predict", Vec::new()).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
