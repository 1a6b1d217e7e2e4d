//! OpenAI embeddings: one request per text, at most [`MAX_IN_FLIGHT`] at a time.

use crate::config::ShapeshiftConfig;
use crate::http::{build_client, post_json, realign, EmbeddingList};
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use shapeshift_core::{EmbeddingProvider, Result, Vector};
use tracing::debug;

const PROVIDER: &str = "openai";

/// Per-text requests allowed in flight for one `embed` call.
pub const MAX_IN_FLIGHT: usize = 8;

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    input: &'a str,
    model: &'a str,
}

/// Client for OpenAI's `/v1/embeddings` endpoint.
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
}

impl OpenAiProvider {
    pub fn new(config: &ShapeshiftConfig) -> Result<Self> {
        Ok(Self {
            http: build_client(PROVIDER)?,
            api_key: config.api_key.clone(),
            model: config.model().to_string(),
            url: format!("{}/v1/embeddings", config.base_url()),
        })
    }

    async fn embed_one(&self, text: &str) -> Result<Vector> {
        let request = EmbedRequest {
            input: text,
            model: &self.model,
        };
        let response: EmbeddingList =
            post_json(&self.http, PROVIDER, &self.url, &self.api_key, &request).await?;
        let mut vectors = realign(PROVIDER, response.data, 1)?;
        Ok(vectors.swap_remove(0))
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vector>> {
        debug!(count = texts.len(), model = %self.model, "openai per-text embed");
        // buffered yields outputs in input order, not completion order.
        let requests: Vec<_> = texts.iter().map(|text| self.embed_one(text)).collect();
        stream::iter(requests)
            .buffered(MAX_IN_FLIGHT)
            .try_collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use actix_web::{web, HttpRequest, HttpResponse};
    use serde_json::{json, Value};
    use shapeshift_core::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn provider(base_url: &str) -> OpenAiProvider {
        let config = ShapeshiftConfig::new("openai", testing::API_KEY)
            .unwrap()
            .with_model("text-embedding-3-large")
            .with_base_url(base_url);
        OpenAiProvider::new(&config).unwrap()
    }

    #[test]
    fn test_request_body() {
        let request = EmbedRequest {
            input: "user.name",
            model: "text-embedding-3-small",
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"input": "user.name", "model": "text-embedding-3-small"})
        );
    }

    #[test]
    fn test_configuration() {
        let provider = provider("https://proxy.internal/openai/");
        assert_eq!(provider.model(), "text-embedding-3-large");
        assert_eq!(provider.url, "https://proxy.internal/openai/v1/embeddings");
    }

    #[tokio::test]
    async fn test_empty_batch_skips_request() {
        let provider = provider("http://127.0.0.1:1");
        assert!(provider.embed(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_connection_failure_is_provider_error() {
        let provider = provider("http://127.0.0.1:1");
        let texts = vec!["a".to_string(), "b".to_string()];
        let err = provider.embed(&texts).await.unwrap_err();
        assert!(matches!(err, Error::Provider { .. }));
    }

    const LEAVES: usize = 12;

    /// Tracks how many requests overlap and in which order they finish.
    #[derive(Default)]
    struct Recorder {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        finished: Mutex<Vec<usize>>,
    }

    /// Embeds `leafN` as `[N, 1]`; earlier leaves answer later.
    async fn slow_first(
        req: HttpRequest,
        recorder: web::Data<Recorder>,
        body: web::Json<Value>,
    ) -> HttpResponse {
        if let Some(denied) = testing::check_auth(&req) {
            return denied;
        }
        let input = body["input"].as_str().unwrap_or_default();
        let Ok(leaf) = input.trim_start_matches("leaf").parse::<usize>() else {
            return HttpResponse::TooManyRequests().json(json!({"error": {"message": "rate limited"}}));
        };

        let now = recorder.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        recorder.peak.fetch_max(now, Ordering::SeqCst);
        actix_web::rt::time::sleep(Duration::from_millis(((LEAVES - leaf) * 15) as u64)).await;
        recorder.in_flight.fetch_sub(1, Ordering::SeqCst);
        recorder.finished.lock().unwrap().push(leaf);

        HttpResponse::Ok().json(json!({
            "object": "list",
            "data": [{"object": "embedding", "embedding": [leaf as f32, 1.0], "index": 0}],
            "model": "text-embedding-3-large"
        }))
    }

    fn serve_recorded(recorder: web::Data<Recorder>) -> String {
        testing::serve(move |cfg: &mut web::ServiceConfig| {
            cfg.app_data(recorder.clone())
                .route("/v1/embeddings", web::post().to(slow_first));
        })
    }

    #[actix_web::test]
    async fn test_out_of_order_responses_keep_input_order() {
        let recorder = web::Data::new(Recorder::default());
        let base = serve_recorded(recorder.clone());

        let texts: Vec<String> = (0..LEAVES).map(|i| format!("leaf{}", i)).collect();
        let vectors = provider(&base).embed(&texts).await.unwrap();

        let firsts: Vec<f32> = vectors.iter().map(|v| v.as_slice()[0]).collect();
        let expected: Vec<f32> = (0..LEAVES).map(|i| i as f32).collect();
        assert_eq!(firsts, expected);

        let finished = recorder.finished.lock().unwrap().clone();
        assert_eq!(finished.len(), LEAVES);
        assert_ne!(finished, (0..LEAVES).collect::<Vec<_>>());

        let peak = recorder.peak.load(Ordering::SeqCst);
        assert!(peak > 1 && peak <= MAX_IN_FLIGHT, "peak in flight {peak}");
    }

    #[actix_web::test]
    async fn test_one_failed_text_fails_the_call() {
        let base = serve_recorded(web::Data::new(Recorder::default()));

        let texts = vec!["leaf0".to_string(), "user.name".to_string(), "leaf2".to_string()];
        match provider(&base).embed(&texts).await.unwrap_err() {
            Error::Provider { provider, message } => {
                assert_eq!(provider, "openai");
                assert!(message.contains("429"), "{message}");
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[actix_web::test]
    async fn test_malformed_body_is_provider_error() {
        let base = testing::serve(|cfg: &mut web::ServiceConfig| {
            cfg.route("/v1/embeddings", web::post().to(testing::garbage));
        });

        let err = provider(&base).embed(&["a".to_string()]).await.unwrap_err();
        assert!(matches!(err, Error::Provider { ref message, .. } if message.contains("malformed")));
    }
}
