use serde_json::Value;

use crate::artifacts::{NumericStats, PreprocessorArtifact};
use crate::errors::AppError;
use crate::schema::{lookup, resolve_column, RawLeadRecord, SENTINEL_CATEGORY};

/// Model-ready feature vector: fixed width, fixed column order, both set at
/// training time by the fitted preprocessor.
pub type FeatureVector = Vec<f64>;

/// Applies the fitted preprocessor to raw lead records.
///
/// The transform is a pure function of the record and the loaded
/// preprocessor state: no field is required, every recognized field has a
/// defined fallback, and the output always matches the trained column set.
pub struct FeatureTransformer<'a> {
    preprocessor: &'a PreprocessorArtifact,
}

impl<'a> FeatureTransformer<'a> {
    pub fn new(preprocessor: &'a PreprocessorArtifact) -> Self {
        Self { preprocessor }
    }

    /// Transforms a raw record into a feature vector.
    ///
    /// Numeric columns are imputed with the training-time median when
    /// absent, then scaled with the stored scaler parameters. Categorical
    /// columns fall back to the "Not Specified" sentinel and are expanded
    /// against the learned one-hot vocabulary; values unseen during
    /// training produce an all-zero block instead of failing.
    pub fn transform(&self, record: &RawLeadRecord) -> Result<FeatureVector, AppError> {
        for key in record.keys() {
            if resolve_column(key).is_none() {
                tracing::debug!(field = %key, "Ignoring unrecognized field");
            }
        }

        let mut features = Vec::with_capacity(self.preprocessor.output_width());

        for stats in &self.preprocessor.numeric {
            let value = self.numeric_value(record, stats)?;
            features.push((value - stats.mean) / stats.std);
        }

        for field in &self.preprocessor.categorical {
            let value = categorical_value(record, &field.name)?;
            for category in &field.categories {
                features.push(if category_matches(category, &value) {
                    1.0
                } else {
                    0.0
                });
            }
        }

        // Width is fixed by the artifact; a disagreement here is version
        // skew between transform code and preprocessor, not bad input.
        if features.len() != self.preprocessor.output_width() {
            return Err(AppError::SchemaMismatch(format!(
                "transform produced {} columns, preprocessor expects {}",
                features.len(),
                self.preprocessor.output_width()
            )));
        }

        Ok(features)
    }

    fn numeric_value(
        &self,
        record: &RawLeadRecord,
        stats: &NumericStats,
    ) -> Result<f64, AppError> {
        let parsed = match lookup(record, &stats.name) {
            None | Some(Value::Null) => return Ok(stats.median),
            Some(Value::Number(n)) => n.as_f64().ok_or_else(|| {
                AppError::Validation(format!(
                    "field '{}' is out of numeric range",
                    stats.name
                ))
            })?,
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(stats.median);
                }
                trimmed.parse::<f64>().map_err(|_| {
                    AppError::Validation(format!(
                        "field '{}' must be numeric, got '{}'",
                        stats.name, trimmed
                    ))
                })?
            }
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "field '{}' must be a number, got {}",
                    stats.name,
                    json_type_name(other)
                )))
            }
        };

        if !parsed.is_finite() {
            return Err(AppError::Validation(format!(
                "field '{}' must be a finite number",
                stats.name
            )));
        }
        if parsed < 0.0 {
            return Err(AppError::Validation(format!(
                "field '{}' must be non-negative, got {}",
                stats.name, parsed
            )));
        }
        Ok(parsed)
    }
}

fn categorical_value(record: &RawLeadRecord, column: &str) -> Result<String, AppError> {
    match lookup(record, column) {
        None | Some(Value::Null) => Ok(SENTINEL_CATEGORY.to_string()),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(SENTINEL_CATEGORY.to_string())
            } else {
                Ok(trimmed.to_string())
            }
        }
        Some(other) => Err(AppError::Validation(format!(
            "field '{}' must be a string, got {}",
            column,
            json_type_name(other)
        ))),
    }
}

fn category_matches(trained: &str, value: &str) -> bool {
    trained == value || trained.eq_ignore_ascii_case(value)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::CategoricalVocabulary;
    use crate::schema::{is_numeric, EXPECTED_COLUMNS, NUMERIC_COLUMNS};
    use serde_json::json;

    fn preprocessor() -> PreprocessorArtifact {
        PreprocessorArtifact {
            version: "test".to_string(),
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
                    categories: vec!["Yes".to_string(), "No".to_string()],
                })
                .collect(),
        }
    }

    #[test]
    fn test_numeric_scaling_uses_stored_parameters() {
        let pre = preprocessor();
        let transformer = FeatureTransformer::new(&pre);
        let mut record = RawLeadRecord::new();
        record.insert("TotalVisits".to_string(), json!(9));

        let features = transformer.transform(&record).unwrap();
        // (9 - mean 5) / std 2
        assert_eq!(features[0], 2.0);
        // Missing numerics are imputed with the median, then scaled.
        assert_eq!(features[1], (3.0 - 5.0) / 2.0);
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let pre = preprocessor();
        let transformer = FeatureTransformer::new(&pre);
        let mut record = RawLeadRecord::new();
        record.insert("TotalVisits".to_string(), json!(" 7 "));

        let features = transformer.transform(&record).unwrap();
        assert_eq!(features[0], 1.0);
    }

    #[test]
    fn test_negative_numeric_is_validation_error() {
        let pre = preprocessor();
        let transformer = FeatureTransformer::new(&pre);
        let mut record = RawLeadRecord::new();
        record.insert("TotalVisits".to_string(), json!(-1));

        let err = transformer.transform(&record).unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert!(err.to_string().contains("TotalVisits"));
    }

    #[test]
    fn test_output_width_is_fixed() {
        let pre = preprocessor();
        let transformer = FeatureTransformer::new(&pre);
        let features = transformer.transform(&RawLeadRecord::new()).unwrap();
        assert_eq!(features.len(), pre.output_width());
    }
}
