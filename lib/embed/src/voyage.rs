//! Voyage embeddings: one batched HTTP request per call.

use crate::config::ShapeshiftConfig;
use crate::http::{build_client, post_json, realign, EmbeddingList};
use async_trait::async_trait;
use serde::Serialize;
use shapeshift_core::{EmbeddingProvider, Result, Vector};
use tracing::debug;

const PROVIDER: &str = "voyage";

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

/// Client for Voyage AI's `/v1/embeddings` endpoint.
pub struct VoyageProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
}

impl VoyageProvider {
    pub fn new(config: &ShapeshiftConfig) -> Result<Self> {
        Ok(Self {
            http: build_client(PROVIDER)?,
            api_key: config.api_key.clone(),
            model: config.model().to_string(),
            url: format!("{}/v1/embeddings", config.base_url()),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for VoyageProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(count = texts.len(), model = %self.model, "voyage batch embed");

        let request = EmbedRequest {
            input: texts,
            model: &self.model,
        };
        let response: EmbeddingList =
            post_json(&self.http, PROVIDER, &self.url, &self.api_key, &request).await?;
        realign(PROVIDER, response.data, texts.len())
    }
}
