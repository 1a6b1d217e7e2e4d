//! # shapeshift
//!
//! Reshape nested JSON records into the structure of a target template by
//! matching field paths on meaning rather than on exact names.
//!
//! shapeshift flattens both records into dot-joined leaf paths, embeds every
//! path with an embedding service, pairs each source leaf with its most
//! similar target leaf (cosine similarity above a threshold), and rebuilds a
//! target-shaped record from the matches.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! export SHAPESHIFT_API_KEY=...
//! shapeshift --provider voyage map --source user.json --target template.json
//! shapeshift --provider cohere serve --http-port 6480
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use shapeshift::prelude::*;
//! use serde_json::json;
//!
//! # async fn run() -> shapeshift::Result<()> {
//! let config = ShapeshiftConfig::new("openai", "sk-...")?.with_threshold(0.55);
//! let shifter = from_config(&config)?;
//!
//! let source = json!({"customer": {"first_name": "Ada", "years": 36}});
//! let target = json!({"name": "", "age": 0});
//! let reshaped = shifter.shapeshift(&source, &target).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - [`shapeshift-core`](shapeshift_core) - flattening, cosine matching, the orchestrator
//! - [`shapeshift-embed`](shapeshift_embed) - Cohere, OpenAI and Voyage bindings
//! - [`shapeshift-api`](shapeshift_api) - REST API

// Re-export core types
pub use shapeshift_core::{
    flatten, flatten_value, unflatten, find_closest_match, cosine_similarity,
    EmbeddingProvider, FlattenedRecord, LeafValue, Matcher, MatchReport,
    Shapeshifted, Shapeshifter, Vector,
    Error, Result,
};

// Re-export providers
pub use shapeshift_embed::{create_provider, from_config, ProviderKind, ShapeshiftConfig};

// Re-export API
pub use shapeshift_api::RestApi;

use std::path::Path;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        from_config, EmbeddingProvider, Error, MatchReport, ProviderKind, Result,
        ShapeshiftConfig, Shapeshifted, Shapeshifter,
    };
}

/// Read a JSON record from disk.
pub fn load_record<P: AsRef<Path>>(path: P) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
