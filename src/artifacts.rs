use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::schema::{is_numeric, EXPECTED_COLUMNS, NUMERIC_COLUMNS};

/// File name of the serialized preprocessor inside the artifact directory.
pub const PREPROCESSOR_FILE: &str = "preprocessor.json";
/// File name of the serialized classifier inside the artifact directory.
pub const CLASSIFIER_FILE: &str = "model.json";

// Searched in order when LEAD_MODEL_DIR is not set.
const CANDIDATE_DIRS: [&str; 3] = ["models", "../models", "/app/models"];

/// Training-time statistics for one numeric column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericStats {
    /// Raw column name.
    pub name: String,
    /// Median used to impute missing values.
    pub median: f64,
    /// Mean captured by the fitted scaler.
    pub mean: f64,
    /// Standard deviation captured by the fitted scaler.
    pub std: f64,
}

/// One-hot vocabulary learned at training time for one categorical column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalVocabulary {
    /// Raw column name.
    pub name: String,
    /// Category values in the column order of the trained encoder.
    pub categories: Vec<String>,
}

/// Fitted preprocessor: imputation statistics, one-hot vocabularies and
/// scaler parameters, all captured at training time and applied unchanged
/// at inference time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessorArtifact {
    /// Artifact version, reported in responses and /v2/models/info.
    pub version: String,
    /// Numeric columns in training order.
    pub numeric: Vec<NumericStats>,
    /// Categorical columns in training order.
    pub categorical: Vec<CategoricalVocabulary>,
}

impl PreprocessorArtifact {
    /// Width of the feature vector this preprocessor produces: one column
    /// per numeric field plus one per learned category.
    pub fn output_width(&self) -> usize {
        self.numeric.len()
            + self
                .categorical
                .iter()
                .map(|c| c.categories.len())
                .sum::<usize>()
    }

    /// Expanded feature column names in output order.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.numeric.iter().map(|n| n.name.clone()).collect();
        for field in &self.categorical {
            for category in &field.categories {
                names.push(format!("{}_{}", field.name, category));
            }
        }
        names
    }

    /// Checks the artifact against the recognized-field registry.
    ///
    /// The numeric and categorical column lists must match the training
    /// schema exactly (same columns, same order) and every scaler std must
    /// be a positive finite number, otherwise scaling would divide by zero
    /// or produce non-finite features.
    pub fn validate(&self) -> Result<()> {
        let numeric_names: Vec<&str> = self.numeric.iter().map(|n| n.name.as_str()).collect();
        if numeric_names != NUMERIC_COLUMNS {
            bail!(
                "preprocessor numeric columns {:?} do not match expected {:?}",
                numeric_names,
                NUMERIC_COLUMNS
            );
        }

        let expected_categorical: Vec<&str> = EXPECTED_COLUMNS
            .iter()
            .copied()
            .filter(|c| !is_numeric(c))
            .collect();
        let categorical_names: Vec<&str> =
            self.categorical.iter().map(|c| c.name.as_str()).collect();
        if categorical_names != expected_categorical {
            bail!(
                "preprocessor categorical columns {:?} do not match expected {:?}",
                categorical_names,
                expected_categorical
            );
        }

        for stats in &self.numeric {
            if !stats.std.is_finite() || stats.std <= 0.0 {
                bail!("invalid scaler std {} for column '{}'", stats.std, stats.name);
            }
            if !stats.median.is_finite() || !stats.mean.is_finite() {
                bail!("non-finite scaler statistics for column '{}'", stats.name);
            }
        }

        for field in &self.categorical {
            if field.categories.is_empty() {
                bail!("empty one-hot vocabulary for column '{}'", field.name);
            }
        }

        Ok(())
    }
}

/// Fitted binary classifier: logistic regression coefficients over the
/// preprocessor's output columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    /// Artifact version, reported as `model_version` in predictions.
    pub version: String,
    /// Model family identifier, e.g. "logistic_regression".
    pub model_type: String,
    /// One coefficient per feature column, in preprocessor output order.
    pub coefficients: Vec<f64>,
    /// Intercept term.
    pub intercept: f64,
    /// Decision threshold on P(convert).
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Class labels; index 1 is the positive (converting) class.
    #[serde(default = "default_classes")]
    pub classes: Vec<i64>,
}

fn default_threshold() -> f64 {
    0.5
}

fn default_classes() -> Vec<i64> {
    vec![0, 1]
}

impl ClassifierArtifact {
    /// Checks coefficient finiteness and threshold sanity.
    pub fn validate(&self) -> Result<()> {
        if self.coefficients.is_empty() {
            bail!("classifier has no coefficients");
        }
        if self.coefficients.iter().any(|c| !c.is_finite()) || !self.intercept.is_finite() {
            bail!("classifier has non-finite coefficients");
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            bail!("decision threshold {} outside [0, 1]", self.threshold);
        }
        Ok(())
    }
}

/// The pair of fitted artifacts loaded at startup and shared read-only
/// across all request handlers for the process lifetime.
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub preprocessor: PreprocessorArtifact,
    pub classifier: ClassifierArtifact,
}

impl ArtifactBundle {
    /// Loads both artifacts from `dir`, validating each and the pair's
    /// width contract. Any failure here means the service starts degraded.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        let preprocessor = load_json::<PreprocessorArtifact>(&dir.join(PREPROCESSOR_FILE))?;
        preprocessor
            .validate()
            .context("preprocessor artifact failed validation")?;
        tracing::info!(
            version = %preprocessor.version,
            width = preprocessor.output_width(),
            "Preprocessor loaded successfully"
        );

        let classifier = load_json::<ClassifierArtifact>(&dir.join(CLASSIFIER_FILE))?;
        classifier
            .validate()
            .context("classifier artifact failed validation")?;
        tracing::info!(
            version = %classifier.version,
            model_type = %classifier.model_type,
            "Model loaded successfully"
        );

        let bundle = Self {
            preprocessor,
            classifier,
        };
        bundle.check_width_contract()?;
        Ok(bundle)
    }

    /// Resolves the artifact directory and loads the bundle from it.
    ///
    /// `dir_override` (from LEAD_MODEL_DIR) wins when set; otherwise the
    /// candidate directories are searched in order for one containing both
    /// artifact files.
    pub fn load_default(dir_override: Option<&str>) -> Result<Self> {
        let dir = resolve_artifact_dir(dir_override)?;
        tracing::info!(dir = %dir.display(), "Loading artifact bundle");
        Self::load(dir)
    }

    /// Rejects bundles whose classifier was trained against a different
    /// feature width than the preprocessor produces (artifact version skew).
    fn check_width_contract(&self) -> Result<()> {
        let expected = self.preprocessor.output_width();
        let got = self.classifier.coefficients.len();
        if expected != got {
            bail!(
                "artifact version skew: preprocessor produces {} columns but classifier expects {}",
                expected,
                got
            );
        }
        Ok(())
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read artifact file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse artifact file {}", path.display()))
}

fn resolve_artifact_dir(dir_override: Option<&str>) -> Result<PathBuf> {
    if let Some(dir) = dir_override {
        let path = PathBuf::from(dir);
        if !path.join(PREPROCESSOR_FILE).exists() || !path.join(CLASSIFIER_FILE).exists() {
            bail!(
                "LEAD_MODEL_DIR={} does not contain {} and {}",
                path.display(),
                PREPROCESSOR_FILE,
                CLASSIFIER_FILE
            );
        }
        return Ok(path);
    }

    for candidate in CANDIDATE_DIRS {
        let path = PathBuf::from(candidate);
        if path.join(PREPROCESSOR_FILE).exists() && path.join(CLASSIFIER_FILE).exists() {
            return Ok(path);
        }
        tracing::debug!(dir = %path.display(), "No artifact bundle in candidate directory");
    }

    bail!(
        "no artifact directory found; searched {:?} (set LEAD_MODEL_DIR to override)",
        CANDIDATE_DIRS
    )
}
