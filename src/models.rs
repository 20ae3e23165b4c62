use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============ Response Models ============

/// Response body for a successful prediction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PredictionResponse {
    /// Predicted class: 1 = will convert, 0 = will not.
    pub prediction: i64,
    /// Conversion probability scaled to [0, 100], rounded to 2 decimals.
    pub lead_score: f64,
    /// Human-readable prediction label.
    pub label: String,
    /// RFC 3339 timestamp of the prediction.
    pub timestamp: String,
    /// Version of the classifier artifact that produced the prediction.
    pub model_version: String,
}

/// Response body for the health endpoint.
///
/// `status` is "healthy" only when both artifacts loaded at startup;
/// otherwise "degraded", which readiness probes treat as not-ready.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// "healthy" or "degraded".
    pub status: String,
    /// Whether the classifier artifact is loaded.
    pub model_loaded: bool,
    /// Whether the preprocessor artifact is loaded.
    pub preprocessor_loaded: bool,
    /// Number of successful predictions served since startup.
    pub predictions_count: u64,
    /// RFC 3339 timestamp of this health report.
    pub timestamp: String,
    /// Service version.
    pub version: String,
    /// Seconds since startup, e.g. "421s".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<String>,
}

/// Response body describing the loaded artifact bundle.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelInfoResponse {
    /// Whether the classifier artifact is loaded.
    pub model_loaded: bool,
    /// Whether the preprocessor artifact is loaded.
    pub preprocessor_loaded: bool,
    /// Raw feature columns the transform recognizes, in training order.
    pub expected_features: Vec<String>,
    /// Number of raw feature columns.
    pub feature_count: usize,
    /// Width of the model-ready feature vector, when the bundle is loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_width: Option<usize>,
    /// Class labels of the classifier, when loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_classes: Option<Vec<i64>>,
    /// Model family identifier, when loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    /// Preprocessor artifact version, when loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preprocessor_version: Option<String>,
    /// Classifier artifact version, when loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

/// Error body returned for all request-path failures.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable message naming the offending field or shape.
    pub error: String,
    /// Machine-readable kind: "validation", "schema_mismatch",
    /// "model_unavailable" or "inference".
    pub kind: String,
}
