//! Features Module - Inference request construction
//!
//! `layout` holds the artifact-declared column order, `vector` projects raw
//! user input onto it.

pub mod layout;
pub mod vector;

// Re-export common types
pub use layout::{layout_fingerprint, FeatureOrder};
pub use vector::{build_feature_vector, FeatureRecord, FeatureValue, FeatureVector};
