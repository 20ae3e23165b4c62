use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
///
/// The four request-path kinds are terminal for the request they occur in;
/// none of them takes the serving process down.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Malformed or mistyped raw input (names the offending field).
    Validation(String),
    /// Feature width does not match what the artifacts expect — indicates
    /// artifact/code version skew, not a client problem.
    SchemaMismatch(String),
    /// Artifact bundle missing or failed to load at startup.
    ModelUnavailable(String),
    /// Numeric failure during scoring (e.g. non-finite feature values).
    Inference(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    /// Stable machine-readable kind, carried in error response bodies so
    /// clients can tell client-input problems from artifact problems.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::SchemaMismatch(_) => "schema_mismatch",
            AppError::ModelUnavailable(_) => "model_unavailable",
            AppError::Inference(_) => "inference",
            AppError::WithContext { source, .. } => source.kind(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::SchemaMismatch(msg) => write!(f, "Schema mismatch: {}", msg),
            AppError::ModelUnavailable(msg) => write!(f, "Model unavailable: {}", msg),
            AppError::Inference(msg) => write!(f, "Inference error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Maps each error variant to an appropriate HTTP status code and JSON
    /// body. Logs errors appropriately based on their severity.
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::SchemaMismatch(msg) => {
                tracing::error!("Schema mismatch: {}", msg);
                (StatusCode::UNPROCESSABLE_ENTITY, msg.clone())
            }
            AppError::ModelUnavailable(msg) => {
                tracing::warn!("Model unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg.clone())
            }
            AppError::Inference(msg) => {
                tracing::error!("Inference error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::WithContext { source, context } => {
                // Log full context chain for debugging
                tracing::error!("Error with context: {} -> {}", context, source);
                // Delegate to underlying error's response
                return source.clone().into_response();
            }
        };

        let body = Json(json!({
            "error": error_message,
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_survives_context_wrapping() {
        let err: Result<(), AppError> = Err(AppError::Validation(
            "field 'TotalVisits' must be numeric".to_string(),
        ));
        let wrapped = err.context("preparing features").unwrap_err();
        assert_eq!(wrapped.kind(), "validation");
        assert!(wrapped.to_string().contains("preparing features"));
    }
}
