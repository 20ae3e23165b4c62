/// Property-based tests using proptest
/// Tests invariants that must hold for every lead record
mod common;

use common::{fitted_bundle, fitted_preprocessor};
use lead_scoring_api::schema::RawLeadRecord;
use lead_scoring_api::scorer::Scorer;
use lead_scoring_api::transform::FeatureTransformer;
use proptest::prelude::*;
use serde_json::json;

fn feature_vectors() -> impl Strategy<Value = Vec<f64>> {
    let width = fitted_preprocessor().output_width();
    prop::collection::vec(-100.0f64..100.0, width)
}

// Property: the transform is total over string-valued fields and never panics
proptest! {
    #[test]
    fn transform_never_panics_on_arbitrary_strings(
        city in "\\PC*",
        visits in "\\PC*"
    ) {
        let pre = fitted_preprocessor();
        let transformer = FeatureTransformer::new(&pre);

        let mut record = RawLeadRecord::new();
        record.insert("City".to_string(), json!(city));
        record.insert("TotalVisits".to_string(), json!(visits));

        // Categorical strings always transform; numeric strings may fail
        // validation, but the call itself must return.
        let _ = transformer.transform(&record);
    }

    #[test]
    fn transform_output_width_is_constant(
        visits in proptest::option::of(0.0f64..1_000_000.0),
        origin in proptest::option::of("[a-zA-Z ]{0,30}")
    ) {
        let pre = fitted_preprocessor();
        let transformer = FeatureTransformer::new(&pre);

        let mut record = RawLeadRecord::new();
        if let Some(v) = visits {
            record.insert("TotalVisits".to_string(), json!(v));
        }
        if let Some(o) = origin {
            record.insert("Lead Origin".to_string(), json!(o));
        }

        let features = transformer.transform(&record).unwrap();
        prop_assert_eq!(features.len(), pre.output_width());
    }

    #[test]
    fn numeric_strings_coerce_to_the_same_vector(visits in 0.0f64..1_000_000.0) {
        let pre = fitted_preprocessor();
        let transformer = FeatureTransformer::new(&pre);

        let mut as_number = RawLeadRecord::new();
        as_number.insert("TotalVisits".to_string(), json!(visits));
        let mut as_string = RawLeadRecord::new();
        as_string.insert("TotalVisits".to_string(), json!(visits.to_string()));

        prop_assert_eq!(
            transformer.transform(&as_number).unwrap(),
            transformer.transform(&as_string).unwrap()
        );
    }
}

// Property: scoring stays inside its documented ranges
proptest! {
    #[test]
    fn scores_stay_in_bounds(features in feature_vectors()) {
        let bundle = fitted_bundle();
        let scorer = Scorer::new(&bundle.classifier);

        let prediction = scorer.score(&features).unwrap();
        prop_assert!((0.0..=1.0).contains(&prediction.probability));
        prop_assert!((0.0..=100.0).contains(&prediction.lead_score));
        prop_assert!(prediction.predicted_class == 0 || prediction.predicted_class == 1);
        prop_assert_eq!(
            prediction.predicted_class,
            i64::from(prediction.probability >= bundle.classifier.threshold)
        );
    }

    #[test]
    fn pipeline_is_deterministic(
        visits in 0.0f64..10_000.0,
        origin in "[a-zA-Z ]{0,20}"
    ) {
        let bundle = fitted_bundle();
        let transformer = FeatureTransformer::new(&bundle.preprocessor);
        let scorer = Scorer::new(&bundle.classifier);

        let mut record = RawLeadRecord::new();
        record.insert("TotalVisits".to_string(), json!(visits));
        record.insert("Lead Origin".to_string(), json!(origin));

        let first = scorer.score(&transformer.transform(&record).unwrap()).unwrap();
        let second = scorer.score(&transformer.transform(&record).unwrap()).unwrap();
        prop_assert_eq!(first, second);
    }
}
