//! Column preprocessing: one-hot encoding for categorical columns,
//! standardisation for numeric ones.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::frame::{FeatureFrame, FeatureValue};
use super::ModelError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleUnknown {
    /// Unknown categories encode as an all-zero block
    #[default]
    Ignore,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub column: String,
    pub categories: Vec<String>,
    #[serde(default)]
    pub handle_unknown: HandleUnknown,
}

fn unit_scale() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericColumn {
    pub column: String,
    #[serde(default)]
    pub mean: f64,
    #[serde(default = "unit_scale")]
    pub scale: f64,
}

impl NumericColumn {
    fn standardise(&self, x: f64) -> f64 {
        let scale = if self.scale == 0.0 { 1.0 } else { self.scale };
        (x - self.mean) / scale
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    #[serde(default)]
    pub categorical: Vec<CategoricalColumn>,
    #[serde(default)]
    pub numeric: Vec<NumericColumn>,
}

impl Preprocessor {
    /// Width of the encoded feature vector
    pub fn width(&self) -> usize {
        self.categorical.iter().map(|c| c.categories.len()).sum::<usize>() + self.numeric.len()
    }

    pub fn columns(&self) -> Vec<String> {
        self.categorical
            .iter()
            .map(|c| c.column.clone())
            .chain(self.numeric.iter().map(|n| n.column.clone()))
            .collect()
    }

    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        let mut seen = std::collections::HashSet::new();
        for column in self.columns() {
            if !seen.insert(column.clone()) {
                return Err(ModelError::Invalid(format!("duplicate column '{}'", column)));
            }
        }
        for cat in &self.categorical {
            if cat.categories.is_empty() {
                return Err(ModelError::Invalid(format!(
                    "categorical column '{}' has no categories",
                    cat.column
                )));
            }
        }
        for num in &self.numeric {
            if !num.mean.is_finite() || !num.scale.is_finite() {
                return Err(ModelError::Invalid(format!(
                    "numeric column '{}' has a non-finite mean or scale",
                    num.column
                )));
            }
        }
        Ok(())
    }

    /// Encode one row. Missing categorical columns become an all-zero block,
    /// missing numeric columns are read as 0.0.
    pub fn transform(&self, frame: &FeatureFrame) -> Result<Vec<f64>, ModelError> {
        let mut out = Vec::with_capacity(self.width());

        for cat in &self.categorical {
            let mut block = vec![0.0; cat.categories.len()];
            match frame.get(&cat.column) {
                None => debug!("Column '{}' missing, encoding as zeros", cat.column),
                Some(FeatureValue::Text(value)) => {
                    match cat.categories.iter().position(|c| c == value) {
                        Some(idx) => block[idx] = 1.0,
                        None if cat.handle_unknown == HandleUnknown::Ignore => {
                            debug!("Unknown category {:?} for '{}' ignored", value, cat.column)
                        }
                        None => {
                            return Err(ModelError::UnknownCategory {
                                column: cat.column.clone(),
                                value: value.clone(),
                            })
                        }
                    }
                }
                Some(other) => {
                    return Err(ModelError::ExpectedCategory {
                        column: cat.column.clone(),
                        value: other.to_string(),
                    })
                }
            }
            out.extend(block);
        }

        for num in &self.numeric {
            let x = match frame.get(&num.column) {
                None => {
                    debug!("Column '{}' missing, filling with 0.0", num.column);
                    0.0
                }
                Some(FeatureValue::Number(x)) if x.is_finite() => *x,
                Some(other) => {
                    return Err(ModelError::ExpectedNumber {
                        column: num.column.clone(),
                        value: other.to_string(),
                    })
                }
            };
            out.push(num.standardise(x));
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preprocessor(handle_unknown: HandleUnknown) -> Preprocessor {
        Preprocessor {
            categorical: vec![CategoricalColumn {
                column: "waste_type".into(),
                categories: vec!["Sludge".into(), "Waste Oil".into()],
                handle_unknown,
            }],
            numeric: vec![NumericColumn {
                column: "quantity_tons".into(),
                mean: 10.0,
                scale: 5.0,
            }],
        }
    }

    #[test]
    fn test_transform_one_hot_and_scale() {
        let p = preprocessor(HandleUnknown::Ignore);
        let frame = FeatureFrame::new()
            .with("waste_type", "Waste Oil")
            .with("quantity_tons", 20.0);

        assert_eq!(p.width(), 3);
        assert_eq!(p.transform(&frame).unwrap(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_unknown_category_policy() {
        let frame = FeatureFrame::new()
            .with("waste_type", "Plastic")
            .with("quantity_tons", 10.0);

        let ignored = preprocessor(HandleUnknown::Ignore).transform(&frame).unwrap();
        assert_eq!(ignored, vec![0.0, 0.0, 0.0]);

        let err = preprocessor(HandleUnknown::Error).transform(&frame).unwrap_err();
        assert!(matches!(err, ModelError::UnknownCategory { .. }));
    }

    #[test]
    fn test_missing_columns_are_zero_filled() {
        let p = preprocessor(HandleUnknown::Error);
        let encoded = p.transform(&FeatureFrame::new()).unwrap();
        // quantity 0.0 standardised: (0 - 10) / 5
        assert_eq!(encoded, vec![0.0, 0.0, -2.0]);
    }

    #[test]
    fn test_type_mismatch() {
        let p = preprocessor(HandleUnknown::Ignore);
        let err = p
            .transform(&FeatureFrame::new().with("quantity_tons", "lots"))
            .unwrap_err();
        assert!(matches!(err, ModelError::ExpectedNumber { .. }));

        let err = p
            .transform(&FeatureFrame::new().with("waste_type", 3.0))
            .unwrap_err();
        assert!(matches!(err, ModelError::ExpectedCategory { .. }));
    }

    #[test]
    fn test_zero_scale_is_identity() {
        let p = Preprocessor {
            categorical: vec![],
            numeric: vec![NumericColumn { column: "x".into(), mean: 1.0, scale: 0.0 }],
        };
        assert_eq!(p.transform(&FeatureFrame::new().with("x", 4.0)).unwrap(), vec![3.0]);
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut p = preprocessor(HandleUnknown::Ignore);
        p.numeric.push(NumericColumn { column: "waste_type".into(), mean: 0.0, scale: 1.0 });
        assert!(matches!(p.validate(), Err(ModelError::Invalid(_))));
    }
}
