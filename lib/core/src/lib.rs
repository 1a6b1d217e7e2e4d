//! # shapeshift Core
//!
//! Core library for shapeshift: reshaping a nested JSON record into the field
//! structure of a target template, matching fields by the semantic similarity
//! of their paths instead of by exact name.
//!
//! This crate provides:
//!
//! - [`flatten`] / [`unflatten`] - dot-path flattening of nested objects
//! - [`Vector`] - embedding vectors with cosine similarity
//! - [`Matcher`] - greedy threshold-gated nearest-target assignment
//! - [`EmbeddingProvider`] - the boundary to embedding services
//! - [`Shapeshifter`] - the orchestrator tying it all together
//!
//! ## Example
//!
//! ```rust
//! use shapeshift_core::{flatten, unflatten, LeafValue};
//! use serde_json::json;
//!
//! let tree = json!({"user": {"name": "Ada", "tags": ["x"]}, "age": 36});
//! let flat = flatten(tree.as_object().unwrap()).unwrap();
//!
//! let paths: Vec<&str> = flat.paths().collect();
//! assert_eq!(paths, vec!["user.name", "user.tags", "age"]);
//! assert_eq!(flat.get("user.name"), Some(&LeafValue::String("Ada".into())));
//!
//! let rebuilt = unflatten(&flat).unwrap();
//! assert_eq!(serde_json::Value::Object(rebuilt), tree);
//! ```

pub mod error;
pub mod flatten;
pub mod matcher;
pub mod provider;
pub mod report;
pub mod shapeshift;
pub mod vector;

/// Dot-product kernels used by cosine similarity
///
/// AVX2/FMA on x86_64 when detected at runtime, unrolled scalar otherwise.
pub mod simd;

pub use error::{Error, Result};
pub use flatten::{flatten, flatten_value, unflatten, FlattenedRecord, LeafValue, PATH_SEPARATOR};
pub use matcher::{
    best_match, find_closest_match, Candidate, ClosestMatch, Matcher, DEFAULT_SIMILARITY_THRESHOLD,
};
pub use provider::{ensure_batch_len, ensure_uniform_dim, EmbeddingProvider};
pub use report::{LeafMatch, MatchReport, Overwrite};
pub use shapeshift::{Shapeshifted, Shapeshifter};
pub use vector::{cosine_similarity, Vector};
