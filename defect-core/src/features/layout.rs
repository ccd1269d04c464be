//! Feature Order - Artifact-driven feature layout
//!
//! The column order a scaler/model was fit with is read from the loaded
//! artifact, never hard-coded. Retraining may reorder columns, so every
//! feature vector is projected through a `FeatureOrder`.
//!
//! A CRC32 fingerprint of the ordered names identifies the layout in logs and
//! lets the loader detect a scaler and model fit on different layouts.

use std::collections::HashMap;

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

/// Ordered feature names plus the category vocabularies of categorical columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureOrder {
    names: Vec<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    categories: HashMap<String, Vec<String>>,
}

impl FeatureOrder {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            categories: HashMap::new(),
        }
    }

    /// Declare `feature` categorical; values encode to their index in `values`.
    pub fn with_categories<I, S>(mut self, feature: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories
            .insert(feature.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Same vocabularies, different column order (e.g. the scaler's).
    pub fn reordered(&self, names: &[String]) -> Self {
        let categories = self
            .categories
            .iter()
            .filter(|(name, _)| names.contains(name))
            .map(|(name, values)| (name.clone(), values.clone()))
            .collect();

        Self {
            names: names.to_vec(),
            categories,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn categories(&self, feature: &str) -> Option<&[String]> {
        self.categories.get(feature).map(Vec::as_slice)
    }

    pub fn is_categorical(&self, feature: &str) -> bool {
        self.categories.contains_key(feature)
    }

    /// Index of `value` in the vocabulary of `feature`.
    pub fn category_code(&self, feature: &str, value: &str) -> Option<usize> {
        self.categories
            .get(feature)?
            .iter()
            .position(|v| v == value)
    }

    /// Column index of `name`
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn fingerprint(&self) -> u32 {
        layout_fingerprint(&self.names)
    }
}

/// CRC32 over the ordered names, NUL separated.
pub fn layout_fingerprint(names: &[String]) -> u32 {
    let mut hasher = Hasher::new();

    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}
