//! Shared HTTP plumbing for the provider bindings.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shapeshift_core::{Error, Result, Vector};
use std::time::Duration;

/// Upper bound on a single embedding request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest error body echoed back in a provider error.
const MAX_ERROR_BODY: usize = 512;

pub(crate) fn build_client(provider: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| Error::Configuration(format!("{} HTTP client: {}", provider, e)))
}

/// POST a JSON body with bearer auth and decode the JSON response.
pub(crate) async fn post_json<B, T>(
    client: &reqwest::Client,
    provider: &str,
    url: &str,
    api_key: &str,
    body: &B,
) -> Result<T>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let response = client
        .post(url)
        .bearer_auth(api_key)
        .json(body)
        .send()
        .await
        .map_err(|e| Error::provider(provider, format!("request to {} failed: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::provider(
            provider,
            format!("HTTP {}: {}", status, truncate(&body, MAX_ERROR_BODY)),
        ));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| Error::provider(provider, format!("malformed response: {}", e)))
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// `data[]` entry of OpenAI-style embedding responses.
#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddingData {
    pub embedding: Vec<f32>,
    pub index: usize,
}

/// `{"data": [...]}` body shared by OpenAI and Voyage.
#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddingList {
    pub data: Vec<EmbeddingData>,
}

/// Put vectors back into input order using their reported `index`.
///
/// Every index in `0..expected` must appear exactly once.
pub(crate) fn realign(provider: &str, data: Vec<EmbeddingData>, expected: usize) -> Result<Vec<Vector>> {
    let mut slots: Vec<Option<Vector>> = vec![None; expected];

    for item in data {
        let slot = slots.get_mut(item.index).ok_or_else(|| {
            Error::provider(
                provider,
                format!("embedding index {} out of range for {} inputs", item.index, expected),
            )
        })?;
        if slot.is_some() {
            return Err(Error::provider(
                provider,
                format!("duplicate embedding index {}", item.index),
            ));
        }
        *slot = Some(Vector::new(item.embedding));
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(i, slot)| {
            slot.ok_or_else(|| Error::provider(provider, format!("missing embedding for input {}", i)))
        })
        .collect()
}
