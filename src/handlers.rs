use crate::artifacts::ArtifactBundle;
use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::models::{ErrorBody, HealthResponse, ModelInfoResponse, PredictionResponse};
use crate::schema::EXPECTED_COLUMNS;
use crate::scorer::Scorer;
use crate::transform::FeatureTransformer;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use utoipa::OpenApi;

/// Shared application state injected into handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Fitted artifact pair, absent when startup loading failed.
    pub bundle: Option<ArtifactBundle>,
    /// Successful predictions served since startup.
    pub predictions_count: AtomicU64,
    /// Process start time, reported as uptime by the health endpoint.
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, bundle: Option<ArtifactBundle>) -> Self {
        Self {
            config,
            bundle,
            predictions_count: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    fn bundle(&self) -> Result<&ArtifactBundle, AppError> {
        self.bundle.as_ref().ok_or_else(|| {
            AppError::ModelUnavailable(
                "model artifacts are not loaded; check startup logs".to_string(),
            )
        })
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(predict, health, model_info),
    components(schemas(
        PredictionResponse,
        HealthResponse,
        ModelInfoResponse,
        ErrorBody
    )),
    tags(
        (name = "scoring", description = "Lead conversion scoring"),
        (name = "status", description = "Service and artifact status")
    )
)]
pub struct ApiDoc;

/// Service banner with the available endpoints.
pub async fn root() -> Json<Value> {
    Json(json!({
        "service": "lead-scoring-api",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "predict": "POST /v2/predict",
            "health": "GET /v2/health",
            "model_info": "GET /v2/models/info",
            "docs": "GET /v2/docs"
        }
    }))
}

/// POST /v2/predict
///
/// Scores one raw lead record. Missing fields fall back to training-time
/// defaults, so the minimal valid request body is `{}`.
#[utoipa::path(
    post,
    path = "/v2/predict",
    request_body = Object,
    responses(
        (status = 200, description = "Prediction for one lead", body = PredictionResponse),
        (status = 422, description = "Invalid input or artifact version skew", body = ErrorBody),
        (status = 503, description = "Model artifacts not loaded", body = ErrorBody),
        (status = 500, description = "Numeric failure during scoring", body = ErrorBody)
    ),
    tag = "scoring"
)]
pub async fn predict(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResponse>, AppError> {
    let Json(payload) =
        body.map_err(|e| AppError::Validation(format!("invalid JSON body: {}", e)))?;
    let record = payload
        .as_object()
        .ok_or_else(|| AppError::Validation("request body must be a JSON object".to_string()))?;

    let bundle = state.bundle()?;
    let features = FeatureTransformer::new(&bundle.preprocessor)
        .transform(record)
        .context("preparing features")?;
    let prediction = Scorer::new(&bundle.classifier).score(&features)?;

    let count = state.predictions_count.fetch_add(1, Ordering::Relaxed) + 1;
    tracing::info!(
        prediction = prediction.predicted_class,
        lead_score = prediction.lead_score,
        total = count,
        "Prediction served"
    );

    Ok(Json(PredictionResponse {
        prediction: prediction.predicted_class,
        lead_score: prediction.lead_score,
        label: prediction.label.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        model_version: bundle.classifier.version.clone(),
    }))
}

/// GET /v2/health
///
/// Reports 200 with "healthy" when both artifacts loaded at startup and
/// 503 with "degraded" otherwise, so orchestrator probes can gate traffic.
#[utoipa::path(
    get,
    path = "/v2/health",
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 503, description = "Artifacts failed to load", body = HealthResponse)
    ),
    tag = "status"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let loaded = state.bundle.is_some();
    let status = if loaded {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if loaded { "healthy" } else { "degraded" }.to_string(),
            model_loaded: loaded,
            preprocessor_loaded: loaded,
            predictions_count: state.predictions_count.load(Ordering::Relaxed),
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime: Some(format!("{}s", state.started_at.elapsed().as_secs())),
        }),
    )
}

/// GET /v2/models/info
///
/// Describes the loaded artifact bundle. Always answers 200; the loaded
/// flags tell clients whether the optional fields are present.
#[utoipa::path(
    get,
    path = "/v2/models/info",
    responses(
        (status = 200, description = "Artifact bundle description", body = ModelInfoResponse)
    ),
    tag = "status"
)]
pub async fn model_info(State(state): State<Arc<AppState>>) -> Json<ModelInfoResponse> {
    let bundle = state.bundle.as_ref();

    Json(ModelInfoResponse {
        model_loaded: bundle.is_some(),
        preprocessor_loaded: bundle.is_some(),
        expected_features: EXPECTED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        feature_count: EXPECTED_COLUMNS.len(),
        vector_width: bundle.map(|b| b.preprocessor.output_width()),
        model_classes: bundle.map(|b| b.classifier.classes.clone()),
        model_type: bundle.map(|b| b.classifier.model_type.clone()),
        preprocessor_version: bundle.map(|b| b.preprocessor.version.clone()),
        model_version: bundle.map(|b| b.classifier.version.clone()),
    })
}

/// API routes that sit behind the rate limiter and body size limit.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/v2/predict", post(predict))
        .route("/v2/models/info", get(model_info))
}

/// Complete route set without middleware, used directly in tests.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v2/health", get(health))
        .merge(api_routes())
        .with_state(state)
}
