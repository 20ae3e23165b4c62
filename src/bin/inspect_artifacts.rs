//! Utility to inspect the artifact bundle and print its structure.

use dotenvy::dotenv;
use lead_scoring_api::artifacts::ArtifactBundle;
use std::env;

/// Loads the bundle the same way the server does and prints the trained
/// columns, vocabularies and classifier shape.
fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let dir_override = env::var("LEAD_MODEL_DIR").ok();
    let bundle = ArtifactBundle::load_default(dir_override.as_deref())?;

    println!(
        "Preprocessor v{} ({} feature columns):",
        bundle.preprocessor.version,
        bundle.preprocessor.output_width()
    );
    for stats in &bundle.preprocessor.numeric {
        println!(
            "- {} (numeric): median={} mean={} std={}",
            stats.name, stats.median, stats.mean, stats.std
        );
    }
    for field in &bundle.preprocessor.categorical {
        println!(
            "- {} (categorical): {} categories",
            field.name,
            field.categories.len()
        );
        for category in &field.categories {
            println!("  - {}", category);
        }
    }

    println!();
    println!(
        "Classifier v{} ({}): {} coefficients, intercept={}, threshold={}, classes={:?}",
        bundle.classifier.version,
        bundle.classifier.model_type,
        bundle.classifier.coefficients.len(),
        bundle.classifier.intercept,
        bundle.classifier.threshold,
        bundle.classifier.classes
    );

    Ok(())
}
