//! Feature Vector - Ordered model input
//!
//! Turns a `FeatureRecord` (what the user entered, keyed by name) into the
//! exact column sequence a `FeatureOrder` demands. An incomplete or unordered
//! vector yields a wrong prediction rather than no prediction, so the
//! projection is strict: every required name must be present.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::layout::{layout_fingerprint, FeatureOrder};
use crate::error::FeatureError;

// ============================================================================
// RAW INPUT
// ============================================================================

/// A single user-entered value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        Self::Category(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        Self::Category(value)
    }
}

/// Feature name -> value. Key order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureRecord {
    values: HashMap<String, FeatureValue>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FeatureValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FeatureValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<FeatureValue> {
        self.values.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<FeatureValue>> FromIterator<(K, V)> for FeatureRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ============================================================================
// ORDERED VECTOR
// ============================================================================

/// Numeric model input in the order of the layout it was built with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Fingerprint of the `FeatureOrder` used to build this vector
    pub layout_fingerprint: u32,
    pub values: Vec<f32>,
}

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get feature by index
    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// Whether this vector was built with exactly these columns, in this order
    pub fn is_compatible(&self, names: &[String]) -> bool {
        self.values.len() == names.len() && self.layout_fingerprint == layout_fingerprint(names)
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self, order: &FeatureOrder) -> serde_json::Value {
        serde_json::json!({
            "layout_fingerprint": self.layout_fingerprint,
            "named_values": order.names().iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.clone(), *value))
                .collect::<HashMap<_, _>>(),
        })
    }
}

/// Project `record` onto `order`.
///
/// Fails with `FeatureError::Missing` naming the first absent feature. Extra
/// keys in `record` are ignored.
pub fn build_feature_vector(
    record: &FeatureRecord,
    order: &FeatureOrder,
) -> Result<FeatureVector, FeatureError> {
    let mut values = Vec::with_capacity(order.len());

    for name in order.names() {
        let value = record
            .get(name)
            .ok_or_else(|| FeatureError::Missing(name.clone()))?;
        values.push(encode(name, value, order)?);
    }

    Ok(FeatureVector {
        layout_fingerprint: order.fingerprint(),
        values,
    })
}

fn encode(name: &str, value: &FeatureValue, order: &FeatureOrder) -> Result<f32, FeatureError> {
    match (value, order.is_categorical(name)) {
        (FeatureValue::Number(n), false) => {
            if n.is_finite() {
                Ok(*n as f32)
            } else {
                Err(FeatureError::InvalidValue {
                    feature: name.to_string(),
                    reason: format!("{} is not a finite number", n),
                })
            }
        }
        (FeatureValue::Category(c), true) => order
            .category_code(name, c)
            .map(|code| code as f32)
            .ok_or_else(|| FeatureError::UnknownCategory {
                feature: name.to_string(),
                value: c.clone(),
            }),
        (FeatureValue::Number(_), true) => Err(FeatureError::InvalidValue {
            feature: name.to_string(),
            reason: "expected a category".to_string(),
        }),
        (FeatureValue::Category(c), false) => Err(FeatureError::InvalidValue {
            feature: name.to_string(),
            reason: format!("expected a number, got '{}'", c),
        }),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const NUMERIC: [&str; 6] = [
        "Temperature",
        "Pressure",
        "Humidity",
        "Machine_Speed",
        "Operator_Experience_Years",
        "Production_Time",
    ];

    fn record() -> FeatureRecord {
        FeatureRecord::new()
            .with("Temperature", 80.0)
            .with("Pressure", 5.2)
            .with("Humidity", 40.0)
            .with("Machine_Speed", 1200.0)
            .with("Operator_Experience_Years", 3.0)
            .with("Production_Time", 8.0)
    }

    #[test]
    fn test_projects_in_declared_order() {
        let order = FeatureOrder::new(NUMERIC);
        let vector = build_feature_vector(&record(), &order).unwrap();

        assert_eq!(vector.values, vec![80.0, 5.2, 40.0, 1200.0, 3.0, 8.0]);
        assert!(vector.is_compatible(order.names()));

        let mut swapped = order.names().to_vec();
        swapped.swap(0, 1);
        assert!(!vector.is_compatible(&swapped));
        assert!(!vector.is_compatible(&order.names()[..5]));
    }

    #[test]
    fn test_every_permutation_reads_by_name() {
        let record = record();
        // rotations and a reversal cover every position for every name
        let mut names: Vec<&str> = NUMERIC.to_vec();
        let mut permutations = Vec::new();
        for _ in 0..names.len() {
            names.rotate_left(1);
            permutations.push(names.clone());
            permutations.push(names.iter().rev().copied().collect::<Vec<_>>());
        }

        for names in permutations {
            let order = FeatureOrder::new(names.clone());
            let vector = build_feature_vector(&record, &order).unwrap();

            for (i, name) in names.iter().enumerate() {
                let expected = match record.get(name) {
                    Some(FeatureValue::Number(n)) => *n as f32,
                    other => panic!("unexpected value {:?}", other),
                };
                assert_eq!(vector.get(i), Some(expected), "position {} ({})", i, name);
            }
        }
    }

    #[test]
    fn test_record_insertion_order_is_irrelevant() {
        let forward = record();
        let backward: FeatureRecord = [
            ("Production_Time", 8.0),
            ("Operator_Experience_Years", 3.0),
            ("Machine_Speed", 1200.0),
            ("Humidity", 40.0),
            ("Pressure", 5.2),
            ("Temperature", 80.0),
        ]
        .into_iter()
        .collect();

        let order = FeatureOrder::new(NUMERIC);
        assert_eq!(
            build_feature_vector(&forward, &order).unwrap(),
            build_feature_vector(&backward, &order).unwrap()
        );
    }

    #[test]
    fn test_missing_feature_is_named() {
        let mut record = record();
        record.remove("Humidity");

        let err = build_feature_vector(&record, &FeatureOrder::new(NUMERIC)).unwrap_err();
        assert_eq!(err, FeatureError::Missing("Humidity".to_string()));
    }

    #[test]
    fn test_missing_feature_is_deterministic() {
        let record = FeatureRecord::new().with("Temperature", 80.0);
        let order = FeatureOrder::new(NUMERIC);

        for _ in 0..5 {
            assert_eq!(
                build_feature_vector(&record, &order).unwrap_err(),
                FeatureError::Missing("Pressure".to_string())
            );
        }
    }

    #[test]
    fn test_extra_keys_are_ignored() {
        let record = record()
            .with("Shift", "Night")
            .with("Material_Type", "Steel")
            .with("Line", 4.0);

        let vector = build_feature_vector(&record, &FeatureOrder::new(NUMERIC)).unwrap();
        assert_eq!(vector.len(), NUMERIC.len());
    }

    #[test]
    fn test_categorical_encoding() {
        let order = FeatureOrder::new(["Temperature", "Shift", "Material_Type"])
            .with_categories("Shift", ["Morning", "Evening", "Night"])
            .with_categories("Material_Type", ["Steel", "Plastic", "Aluminium"]);
        let record = record()
            .with("Shift", "Night")
            .with("Material_Type", "Plastic");

        let vector = build_feature_vector(&record, &order).unwrap();
        assert_eq!(vector.values, vec![80.0, 2.0, 1.0]);
    }

    #[test]
    fn test_unknown_category() {
        let order = FeatureOrder::new(["Shift"]).with_categories("Shift", ["Morning"]);
        let record = FeatureRecord::new().with("Shift", "Weekend");

        assert_eq!(
            build_feature_vector(&record, &order).unwrap_err(),
            FeatureError::UnknownCategory {
                feature: "Shift".to_string(),
                value: "Weekend".to_string(),
            }
        );
    }

    #[test]
    fn test_type_mismatch() {
        let order = FeatureOrder::new(["Temperature", "Shift"]).with_categories("Shift", ["Morning"]);

        let text_for_number = FeatureRecord::new()
            .with("Temperature", "hot")
            .with("Shift", "Morning");
        assert!(matches!(
            build_feature_vector(&text_for_number, &order),
            Err(FeatureError::InvalidValue { ref feature, .. }) if feature == "Temperature"
        ));

        let number_for_category = FeatureRecord::new()
            .with("Temperature", 20.0)
            .with("Shift", 1.0);
        assert!(matches!(
            build_feature_vector(&number_for_category, &order),
            Err(FeatureError::InvalidValue { ref feature, .. }) if feature == "Shift"
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        let record = FeatureRecord::new().with("Temperature", f64::NAN);
        let err = build_feature_vector(&record, &FeatureOrder::new(["Temperature"])).unwrap_err();
        assert!(matches!(err, FeatureError::InvalidValue { .. }));
    }

    #[test]
    fn test_record_deserializes_mixed_values() {
        let record: FeatureRecord =
            serde_json::from_str(r#"{"Temperature": 80, "Shift": "Night"}"#).unwrap();

        assert_eq!(record.get("Temperature"), Some(&FeatureValue::Number(80.0)));
        assert_eq!(record.get("Shift"), Some(&FeatureValue::Category("Night".to_string())));
    }

    #[test]
    fn test_to_log_entry() {
        let order = FeatureOrder::new(NUMERIC);
        let vector = build_feature_vector(&record(), &order).unwrap();

        let log = vector.to_log_entry(&order);
        assert_eq!(log["named_values"]["Temperature"], 80.0);
        assert_eq!(log["layout_fingerprint"], order.fingerprint());
    }
}
