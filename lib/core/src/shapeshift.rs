//! Shapeshift orchestrator
//!
//! Flattens source and target, embeds both path lists, matches every source
//! leaf to its closest target leaf, and rebuilds a target-shaped record from
//! the accepted matches.
//!
//! ```text
//! source ──flatten──> paths ──embed──┐
//!                                    ├──> matcher ──> result leaves ──unflatten──> output
//! target ──flatten──> paths ──embed──┘
//! ```

use crate::error::Result;
use crate::flatten::{flatten_value, unflatten, FlattenedRecord};
use crate::matcher::{Matcher, DEFAULT_SIMILARITY_THRESHOLD};
use crate::provider::{ensure_batch_len, ensure_uniform_dim, EmbeddingProvider};
use crate::report::{LeafMatch, MatchReport, Overwrite};
use crate::vector::Vector;
use ahash::AHashMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result tree together with the decisions that produced it.
#[derive(Debug, Clone)]
pub struct Shapeshifted {
    /// Target-shaped object holding only matched leaves.
    pub tree: Value,
    pub report: MatchReport,
}

/// Maps records onto a target shape using embedding similarity of leaf paths.
///
/// Holds only read-only configuration, so one instance can serve concurrent
/// calls. Nothing is cached between calls.
#[derive(Clone)]
pub struct Shapeshifter {
    provider: Arc<dyn EmbeddingProvider>,
    matcher: Matcher,
}

impl std::fmt::Debug for Shapeshifter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shapeshifter")
            .field("provider", &self.provider.name())
            .field("model", &self.provider.model())
            .field("threshold", &self.matcher.threshold())
            .finish()
    }
}

impl Shapeshifter {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, threshold: f32) -> Self {
        Self {
            provider,
            matcher: Matcher::new(threshold),
        }
    }

    /// Same as [`Shapeshifter::new`] with a threshold of `0.5`.
    pub fn with_default_threshold(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self::new(provider, DEFAULT_SIMILARITY_THRESHOLD)
    }

    pub fn provider(&self) -> &dyn EmbeddingProvider {
        self.provider.as_ref()
    }

    pub fn threshold(&self) -> f32 {
        self.matcher.threshold()
    }

    /// Reshape `source` into the structure of `target`.
    ///
    /// Both inputs must be JSON objects. Unmatched target leaves are absent
    /// from the output and unmatched source leaves are dropped. When several
    /// source leaves match the same target leaf, the one that comes last in
    /// flattened order wins.
    pub async fn shapeshift(&self, source: &Value, target: &Value) -> Result<Value> {
        Ok(self.shapeshift_with_report(source, target).await?.tree)
    }

    /// Like [`Shapeshifter::shapeshift`], also returning the match report.
    pub async fn shapeshift_with_report(
        &self,
        source: &Value,
        target: &Value,
    ) -> Result<Shapeshifted> {
        let source_flat = flatten_value(source)?;
        let target_flat = flatten_value(target)?;

        let source_paths: Vec<String> = source_flat.paths().map(String::from).collect();
        let target_paths: Vec<String> = target_flat.paths().map(String::from).collect();
        debug!(
            source_leaves = source_paths.len(),
            target_leaves = target_paths.len(),
            provider = self.provider.name(),
            "embedding leaf paths"
        );

        let (source_vectors, target_vectors) = futures_util::future::try_join(
            self.embed_paths(&source_paths),
            self.embed_paths(&target_paths),
        )
        .await?;
        ensure_uniform_dim(source_vectors.iter().chain(target_vectors.iter()))?;

        let candidates = self.matcher.assign(&source_vectors, &target_vectors);

        let mut result = FlattenedRecord::new();
        let mut written_by: AHashMap<usize, usize> = AHashMap::new();
        let mut matches = Vec::with_capacity(candidates.len());
        let mut overwrites = Vec::new();

        for (source_index, ((source_path, value), candidate)) in
            source_flat.iter().zip(&candidates).enumerate()
        {
            if let Some(m) = candidate.matched() {
                let target_path = &target_paths[m.index];
                if let Some(previous) = written_by.insert(m.index, source_index) {
                    warn!(
                        target_path = %target_path,
                        replaced = %source_paths[previous],
                        kept_by = %source_path,
                        "several source leaves matched one target leaf, keeping the last"
                    );
                    overwrites.push(Overwrite {
                        target_path: target_path.clone(),
                        replaced: source_paths[previous].clone(),
                        kept_by: source_path.to_string(),
                    });
                }
                result.insert(target_path.clone(), value.clone());
            }

            matches.push(LeafMatch {
                source_path: source_path.to_string(),
                target_path: candidate.best.map(|m| target_paths[m.index].clone()),
                score: candidate.best.map(|m| m.score),
                accepted: candidate.accepted,
            });
        }

        let unmatched_targets = target_paths
            .iter()
            .enumerate()
            .filter(|(i, _)| !written_by.contains_key(i))
            .map(|(_, path)| path.clone())
            .collect();

        let tree = Value::Object(unflatten(&result)?);
        let report = MatchReport {
            threshold: self.matcher.threshold(),
            matches,
            unmatched_targets,
            overwrites,
        };

        info!(
            source_leaves = source_paths.len(),
            target_leaves = target_paths.len(),
            matched = report.accepted_count(),
            overwrites = report.overwrites.len(),
            "shapeshift complete"
        );

        Ok(Shapeshifted { tree, report })
    }

    /// One provider call per side; empty path lists skip the provider.
    async fn embed_paths(&self, paths: &[String]) -> Result<Vec<Vector>> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = self.provider.embed(paths).await?;
        ensure_batch_len(self.provider.name(), paths.len(), &vectors)?;
        Ok(vectors)
    }
}
