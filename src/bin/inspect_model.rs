//! Print a model artifact's structure and optionally score one row.
//!
//! Usage: inspect_model <artifact> [column=value ...]

use anyhow::{bail, Context, Result};
use waste_carbon::model::{FeatureFrame, FeatureValue, ModelArtifact, Regressor};

fn parse_assignment(arg: &str) -> Result<(String, FeatureValue)> {
    let (column, raw) = arg
        .split_once('=')
        .with_context(|| format!("expected column=value, got '{}'", arg))?;
    let value = match raw.trim().parse::<f64>() {
        Ok(n) => FeatureValue::Number(n),
        Err(_) => FeatureValue::Text(raw.trim().to_string()),
    };
    Ok((column.trim().to_string(), value))
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: inspect_model <artifact> [column=value ...]");
    };

    let model = ModelArtifact::load(&path)?;

    println!("Model:     {}", model.name());
    println!("Estimator: {}", model.estimator.summary());
    println!("Width:     {}", model.encoded_width());
    println!("Columns:");
    for column in model.feature_columns() {
        match model.categories(&column) {
            Some(categories) => println!("  - {} (categorical: {})", column, categories.join(", ")),
            None => println!("  - {} (numeric)", column),
        }
    }

    let mut frame = FeatureFrame::new();
    for arg in args {
        let (column, value) = parse_assignment(&arg)?;
        frame.insert(&column, value);
    }

    if !frame.is_empty() {
        let missing = model.missing_columns(&frame);
        if !missing.is_empty() {
            println!("Filling missing columns with zero: {}", missing.join(", "));
        }
        println!("Prediction: {:.2} kg CO₂e", model.predict(&frame)?);
    }

    Ok(())
}
