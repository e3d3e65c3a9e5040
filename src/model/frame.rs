//! Feature Frame
//!
//! A single input row handed to a [`Regressor`](super::Regressor).

use serde::{Deserialize, Serialize};
use std::fmt;

pub const WASTE_TYPE: &str = "waste_type";
pub const TREATMENT_METHOD: &str = "treatment_method";
pub const VEHICLE_TYPE: &str = "vehicle_type";
pub const QUANTITY_TONS: &str = "quantity_tons";
pub const TRANSPORT_DISTANCE_KM: &str = "transport_distance_km";
pub const TREATMENT_EFFICIENCY_PCT: &str = "treatment_efficiency_pct";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Number(n) => write!(f, "{}", n),
            FeatureValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Number(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Text(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::Text(value)
    }
}

/// Ordered column name -> value pairs, insertion order preserved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureFrame {
    columns: Vec<(String, FeatureValue)>,
}

impl FeatureFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, column: &str, value: impl Into<FeatureValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a column, replacing any previous value
    pub fn insert(&mut self, column: &str, value: impl Into<FeatureValue>) {
        let value = value.into();
        match self.columns.iter_mut().find(|(name, _)| name == column) {
            Some(slot) => slot.1 = value,
            None => self.columns.push((column.to_string(), value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut frame = FeatureFrame::new()
            .with(WASTE_TYPE, "Sludge")
            .with(QUANTITY_TONS, 2.0);
        frame.insert(WASTE_TYPE, "Waste Oil");

        assert_eq!(frame.len(), 2);
        assert_eq!(frame.get(WASTE_TYPE), Some(&FeatureValue::from("Waste Oil")));
        assert_eq!(frame.columns().collect::<Vec<_>>(), vec![WASTE_TYPE, QUANTITY_TONS]);
    }

    #[test]
    fn test_missing_column() {
        let frame = FeatureFrame::new().with(QUANTITY_TONS, 1.0);
        assert!(!frame.contains(TRANSPORT_DISTANCE_KM));
        assert!(frame.get(TRANSPORT_DISTANCE_KM).is_none());
    }
}
