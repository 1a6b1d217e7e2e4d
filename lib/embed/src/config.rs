//! Shapeshifter configuration
//!
//! Fixed at construction and never mutated afterwards. Accepts camelCase JSON:
//!
//! ```json
//! {
//!   "embeddingClient": "voyage",
//!   "apiKey": "...",
//!   "embeddingModel": "voyage-2",
//!   "similarityThreshold": 0.6
//! }
//! ```

use serde::{Deserialize, Serialize};
use shapeshift_core::{Error, Result, DEFAULT_SIMILARITY_THRESHOLD};
use std::fmt;
use std::str::FromStr;

/// Embedding service used to embed leaf paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Cohere,
    OpenAi,
    Voyage,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [ProviderKind::Cohere, ProviderKind::OpenAi, ProviderKind::Voyage];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Cohere => "cohere",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Voyage => "voyage",
        }
    }

    /// Model used when none is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Cohere => "embed-english-v3.0",
            ProviderKind::OpenAi => "text-embedding-3-small",
            ProviderKind::Voyage => "voyage-2",
        }
    }

    /// Public API root.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::Cohere => "https://api.cohere.ai",
            ProviderKind::OpenAi => "https://api.openai.com",
            ProviderKind::Voyage => "https://api.voyageai.com",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cohere" => Ok(ProviderKind::Cohere),
            "openai" => Ok(ProviderKind::OpenAi),
            "voyage" => Ok(ProviderKind::Voyage),
            other => Err(Error::Configuration(format!(
                "unknown embedding client '{}', expected one of cohere, openai, voyage",
                other
            ))),
        }
    }
}

/// Everything needed to build a [`Shapeshifter`](shapeshift_core::Shapeshifter).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeshiftConfig {
    pub embedding_client: ProviderKind,
    #[serde(skip_serializing)]
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_threshold: Option<f32>,
    /// Overrides the provider's API root, e.g. for a proxy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Wire form, with the client tag kept as a string so an unknown tag is a
/// configuration error rather than a parse error.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    embedding_client: String,
    api_key: String,
    #[serde(default)]
    embedding_model: Option<String>,
    #[serde(default)]
    similarity_threshold: Option<f32>,
    #[serde(default)]
    base_url: Option<String>,
}

impl ShapeshiftConfig {
    /// Configuration with provider defaults for model and threshold.
    pub fn new(embedding_client: &str, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            embedding_client: embedding_client.parse()?,
            api_key: api_key.into(),
            embedding_model: None,
            similarity_threshold: None,
            base_url: None,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = Some(model.into());
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = Some(threshold);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(json)?;
        let config = Self {
            embedding_client: raw.embedding_client.parse()?,
            api_key: raw.api_key,
            embedding_model: raw.embedding_model,
            similarity_threshold: raw.similarity_threshold,
            base_url: raw.base_url,
        };
        config.validate()?;
        Ok(config)
    }

    /// Configured model, or the provider default.
    pub fn model(&self) -> &str {
        self.embedding_model
            .as_deref()
            .unwrap_or_else(|| self.embedding_client.default_model())
    }

    /// Configured threshold, or `0.5`. Not range-checked.
    pub fn threshold(&self) -> f32 {
        self.similarity_threshold
            .unwrap_or(DEFAULT_SIMILARITY_THRESHOLD)
    }

    /// API root without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.embedding_client.default_base_url())
            .trim_end_matches('/')
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Configuration(format!(
                "an API key is required for the {} embedding client",
                self.embedding_client
            )));
        }

        if self.model().trim().is_empty() {
            return Err(Error::Configuration("embedding model must not be empty".into()));
        }

        let url = reqwest::Url::parse(self.base_url())
            .map_err(|e| Error::Configuration(format!("invalid base URL '{}': {}", self.base_url(), e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::Configuration(format!(
                "base URL must be http or https, got '{}'",
                url.scheme()
            )));
        }

        Ok(())
    }
}
