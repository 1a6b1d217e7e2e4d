//! Match reports
//!
//! Explains how a reshaped record was produced: which source path went where
//! and with what similarity, which target leaves stayed empty, and which
//! targets were written more than once.

use serde::Serialize;

/// Decision for one source leaf.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LeafMatch {
    /// Source leaf path.
    pub source_path: String,
    /// Closest target path, present even when rejected by the threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_path: Option<String>,
    /// Cosine similarity with `target_path`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    /// Whether the value was copied into the result.
    pub accepted: bool,
}

/// A target leaf that received a value from more than one source leaf.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Overwrite {
    pub target_path: String,
    /// Source path whose value was discarded.
    pub replaced: String,
    /// Source path whose value was kept.
    pub kept_by: String,
}

/// Full explanation of one reshaping call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MatchReport {
    /// Threshold applied to every decision.
    pub threshold: f32,
    /// One entry per source leaf, in flattened order.
    pub matches: Vec<LeafMatch>,
    /// Target leaf paths no source leaf was assigned to.
    pub unmatched_targets: Vec<String>,
    /// Last-write-wins collisions, in the order they happened.
    pub overwrites: Vec<Overwrite>,
}

impl MatchReport {
    /// Number of source leaves copied into the result.
    pub fn accepted_count(&self) -> usize {
        self.matches.iter().filter(|m| m.accepted).count()
    }

    /// Source leaf paths that were dropped.
    pub fn unmatched_sources(&self) -> impl Iterator<Item = &str> {
        self.matches
            .iter()
            .filter(|m| !m.accepted)
            .map(|m| m.source_path.as_str())
    }

    /// Accepted decision for a source path, if it was matched.
    pub fn target_for(&self, source_path: &str) -> Option<&str> {
        self.matches
            .iter()
            .find(|m| m.accepted && m.source_path == source_path)
            .and_then(|m| m.target_path.as_deref())
    }
}
