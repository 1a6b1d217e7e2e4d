//! Cohere embeddings: one batched request per call.

use crate::config::ShapeshiftConfig;
use crate::http::{build_client, post_json};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shapeshift_core::{ensure_batch_len, EmbeddingProvider, Result, Vector};
use tracing::debug;

const PROVIDER: &str = "cohere";

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
    model: &'a str,
    input_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Client for Cohere's `/v1/embed` endpoint.
pub struct CohereProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
}

impl CohereProvider {
    pub fn new(config: &ShapeshiftConfig) -> Result<Self> {
        Ok(Self {
            http: build_client(PROVIDER)?,
            api_key: config.api_key.clone(),
            model: config.model().to_string(),
            url: format!("{}/v1/embed", config.base_url()),
        })
    }

    fn request<'a>(&'a self, texts: &'a [String]) -> EmbedRequest<'a> {
        EmbedRequest {
            texts,
            model: &self.model,
            // v3 models require an input type; leaf paths are embedded symmetrically.
            input_type: "search_document",
        }
    }
}

#[async_trait]
impl EmbeddingProvider for CohereProvider {
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
        debug!(count = texts.len(), model = %self.model, "cohere batch embed");

        let response: EmbedResponse =
            post_json(&self.http, PROVIDER, &self.url, &self.api_key, &self.request(texts)).await?;
        let vectors: Vec<Vector> = response.embeddings.into_iter().map(Vector::new).collect();
        ensure_batch_len(PROVIDER, texts.len(), &vectors)?;
        Ok(vectors)
    }
}
