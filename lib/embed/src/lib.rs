//! # shapeshift Embed
//!
//! HTTP bindings for the embedding services shapeshift can use, all behind
//! the [`EmbeddingProvider`] trait from `shapeshift-core`:
//!
//! | Provider | Strategy | Endpoint |
//! |----------|----------|----------|
//! | [`CohereProvider`] | one batched request | `POST /v1/embed` |
//! | [`OpenAiProvider`] | one request per text, bounded concurrency | `POST /v1/embeddings` |
//! | [`VoyageProvider`] | one batched request | `POST /v1/embeddings` |
//!
//! Whatever the strategy, vectors come back in input order.
//!
//! ## Example
//!
//! ```rust,no_run
//! use shapeshift_embed::{from_config, ShapeshiftConfig};
//! use serde_json::json;
//!
//! # async fn run() -> shapeshift_core::Result<()> {
//! let config = ShapeshiftConfig::new("voyage", std::env::var("VOYAGE_API_KEY").unwrap_or_default())?
//!     .with_threshold(0.6);
//! let shifter = from_config(&config)?;
//!
//! let result = shifter
//!     .shapeshift(
//!         &json!({"user": {"first_name": "Ada"}}),
//!         &json!({"name": ""}),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod cohere;
pub mod config;
mod http;
pub mod openai;
#[cfg(test)]
mod testing;
pub mod voyage;

pub use cohere::CohereProvider;
pub use config::{ProviderKind, ShapeshiftConfig};
pub use http::REQUEST_TIMEOUT;
pub use openai::OpenAiProvider;
pub use voyage::VoyageProvider;

use shapeshift_core::{EmbeddingProvider, Result, Shapeshifter};
use std::sync::Arc;
use tracing::info;

/// Build the provider named by `config.embedding_client`.
pub fn create_provider(config: &ShapeshiftConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    config.validate()?;

    let provider: Arc<dyn EmbeddingProvider> = match config.embedding_client {
        ProviderKind::Cohere => Arc::new(CohereProvider::new(config)?),
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(config)?),
        ProviderKind::Voyage => Arc::new(VoyageProvider::new(config)?),
    };

    info!(
        provider = provider.name(),
        model = provider.model(),
        base_url = config.base_url(),
        "embedding provider configured"
    );
    Ok(provider)
}

/// Build a [`Shapeshifter`] from configuration.
pub fn from_config(config: &ShapeshiftConfig) -> Result<Shapeshifter> {
    let provider = create_provider(config)?;
    Ok(Shapeshifter::new(provider, config.threshold()))
}
