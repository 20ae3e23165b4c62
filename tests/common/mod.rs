use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use lead_scoring_api::artifacts::{
    ArtifactBundle, CategoricalVocabulary, ClassifierArtifact, NumericStats, PreprocessorArtifact,
};
use lead_scoring_api::config::Config;
use lead_scoring_api::handlers::{router, AppState};
use lead_scoring_api::schema::{is_numeric, EXPECTED_COLUMNS, NUMERIC_COLUMNS, SENTINEL_CATEGORY};

/// Helper to create test config without touching the environment.
pub fn test_config() -> Config {
    Config {
        port: 5001,
        allowed_origins: vec!["http://localhost:3000".to_string()],
        model_dir: None,
    }
}

/// Fitted preprocessor over the full training schema with small
/// vocabularies, so tests control every statistic.
pub fn fitted_preprocessor() -> PreprocessorArtifact {
    PreprocessorArtifact {
        version: "0.9-test".to_string(),
        numeric: NUMERIC_COLUMNS
            .iter()
            .map(|name| NumericStats {
                name: name.to_string(),
                median: 3.0,
                mean: 5.0,
                std: 2.0,
            })
            .collect(),
        categorical: EXPECTED_COLUMNS
            .iter()
            .filter(|c| !is_numeric(c))
            .map(|name| CategoricalVocabulary {
                name: name.to_string(),
                categories: vec![
                    "Yes".to_string(),
                    "No".to_string(),
                    SENTINEL_CATEGORY.to_string(),
                ],
            })
            .collect(),
    }
}

/// Classifier matched to [`fitted_preprocessor`]'s output width, with
/// deterministic small coefficients.
pub fn fitted_classifier(width: usize) -> ClassifierArtifact {
    ClassifierArtifact {
        version: "0.9-test".to_string(),
        model_type: "logistic_regression".to_string(),
        coefficients: (0..width).map(|i| ((i % 7) as f64 - 3.0) * 0.05).collect(),
        intercept: 0.25,
        threshold: 0.5,
        classes: vec![0, 1],
    }
}

pub fn fitted_bundle() -> ArtifactBundle {
    let preprocessor = fitted_preprocessor();
    let classifier = fitted_classifier(preprocessor.output_width());
    ArtifactBundle {
        preprocessor,
        classifier,
    }
}

/// Application with a loaded bundle, routed exactly as in production but
/// without middleware.
pub fn app() -> Router {
    router(Arc::new(AppState::new(test_config(), Some(fitted_bundle()))))
}

/// Application that failed artifact loading at startup.
pub fn degraded_app() -> Router {
    router(Arc::new(AppState::new(test_config(), None)))
}

/// Drives one request through the router and decodes the JSON response.
pub async fn request(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
