use crate::artifacts::ClassifierArtifact;
use crate::errors::AppError;
use crate::transform::FeatureVector;

/// Human-readable label for the positive class.
pub const LABEL_CONVERT: &str = "Will Convert";
/// Human-readable label for the negative class.
pub const LABEL_NO_CONVERT: &str = "Will Not Convert";

/// Outcome of scoring one feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Predicted class: 1 = will convert, 0 = will not.
    pub predicted_class: i64,
    /// P(convert) in [0, 1].
    pub probability: f64,
    /// Conversion probability scaled to [0, 100], rounded to 2 decimals.
    pub lead_score: f64,
    /// Fixed label derived from the predicted class.
    pub label: &'static str,
}

/// Applies the fitted logistic regression classifier to feature vectors.
///
/// Stateless per call: concurrent callers share the same immutable
/// classifier and nothing is mutated during scoring.
pub struct Scorer<'a> {
    classifier: &'a ClassifierArtifact,
}

impl<'a> Scorer<'a> {
    pub fn new(classifier: &'a ClassifierArtifact) -> Self {
        Self { classifier }
    }

    /// Scores a feature vector of the expected width.
    ///
    /// Vectors of the wrong width are version skew (SchemaMismatch);
    /// non-finite feature values are an InferenceError, reported before any
    /// arithmetic so the failure names the offending column index.
    pub fn score(&self, features: &FeatureVector) -> Result<Prediction, AppError> {
        let expected = self.classifier.coefficients.len();
        if features.len() != expected {
            return Err(AppError::SchemaMismatch(format!(
                "feature vector has {} columns, classifier expects {}",
                features.len(),
                expected
            )));
        }

        if let Some(idx) = features.iter().position(|v| !v.is_finite()) {
            return Err(AppError::Inference(format!(
                "non-finite value at feature column {}",
                idx
            )));
        }

        let z = self
            .classifier
            .coefficients
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.classifier.intercept;

        let probability = sigmoid(z);
        let predicted_class = i64::from(probability >= self.classifier.threshold);
        let label = if predicted_class == 1 {
            LABEL_CONVERT
        } else {
            LABEL_NO_CONVERT
        };

        Ok(Prediction {
            predicted_class,
            probability,
            lead_score: round2(probability * 100.0),
            label,
        })
    }
}

/// Numerically stable logistic function: never exponentiates a large
/// positive argument.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
