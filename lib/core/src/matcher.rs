//! Similarity matcher
//!
//! Greedy, per-source assignment: every source vector independently picks the
//! target vector with the highest cosine similarity. Targets are never
//! "claimed", so several sources may land on the same target.

use crate::vector::Vector;
use tracing::debug;

/// Similarity a best candidate must reach to be accepted.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.5;

/// Best candidate for one source vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestMatch {
    /// Index into the target list.
    pub index: usize,
    /// Cosine similarity between source and target.
    pub score: f32,
}

/// Highest-similarity target, regardless of threshold.
///
/// Scans linearly with a strict `>` so the earliest index wins ties. `NaN`
/// scores (zero-magnitude or mismatched vectors) never win.
pub fn best_match(source: &Vector, targets: &[Vector]) -> Option<ClosestMatch> {
    let mut best: Option<ClosestMatch> = None;
    let mut best_score = f32::NEG_INFINITY;

    for (index, target) in targets.iter().enumerate() {
        let score = source.cosine_similarity(target);
        if score > best_score {
            best_score = score;
            best = Some(ClosestMatch { index, score });
        }
    }

    best
}

/// Closest target whose similarity is at least `threshold`.
pub fn find_closest_match(
    source: &Vector,
    targets: &[Vector],
    threshold: f32,
) -> Option<ClosestMatch> {
    best_match(source, targets).filter(|m| meets_threshold(*m, threshold))
}

#[inline]
fn meets_threshold(m: ClosestMatch, threshold: f32) -> bool {
    m.score >= threshold
}

/// Outcome of matching one source vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Best target seen, even when it fell below the threshold.
    pub best: Option<ClosestMatch>,
    /// Whether `best` met the threshold.
    pub accepted: bool,
}

impl Candidate {
    /// The accepted match, if any.
    pub fn matched(&self) -> Option<ClosestMatch> {
        self.best.filter(|_| self.accepted)
    }
}

/// Threshold-gated matcher over whole batches.
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    threshold: f32,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl Matcher {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Match every source vector against all targets.
    ///
    /// The output is index-aligned with `sources`.
    pub fn assign(&self, sources: &[Vector], targets: &[Vector]) -> Vec<Candidate> {
        sources
            .iter()
            .enumerate()
            .map(|(i, source)| {
                let best = best_match(source, targets);
                let accepted = best.is_some_and(|m| meets_threshold(m, self.threshold));
                debug!(
                    source = i,
                    target_index = ?best.map(|m| m.index),
                    score = ?best.map(|m| m.score),
                    accepted,
                    "scored source leaf"
                );
                Candidate { best, accepted }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(data: &[f32]) -> Vector {
        Vector::from_slice(data)
    }

    #[test]
    fn test_picks_highest_similarity() {
        let targets = vec![v(&[0.0, 1.0]), v(&[1.0, 0.1]), v(&[-1.0, 0.0])];
        let m = find_closest_match(&v(&[1.0, 0.0]), &targets, 0.5).unwrap();
        assert_eq!(m.index, 1);
        assert!(m.score > 0.99);
    }

    #[test]
    fn test_tie_goes_to_first_index() {
        let targets = vec![v(&[1.0, 0.0]), v(&[2.0, 0.0]), v(&[3.0, 0.0])];
        let m = find_closest_match(&v(&[1.0, 0.0]), &targets, 0.5).unwrap();
        assert_eq!(m.index, 0);
    }

    #[test]
    fn test_below_threshold_is_no_match() {
        let targets = vec![v(&[0.0, 1.0]), v(&[1.0, 1.0])];
        let source = v(&[1.0, 0.0]);

        // best is ~0.707 at index 1
        assert!(find_closest_match(&source, &targets, 0.8).is_none());
        let m = find_closest_match(&source, &targets, 0.7).unwrap();
        assert_eq!(m.index, 1);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let targets = vec![v(&[1.0, 0.0])];
        let m = find_closest_match(&v(&[1.0, 0.0]), &targets, 1.0);
        assert_eq!(m.map(|m| m.index), Some(0));
    }

    #[test]
    fn test_nan_scores_never_match() {
        let targets = vec![v(&[0.0, 0.0]), v(&[0.0, 0.0])];
        assert!(best_match(&v(&[1.0, 0.0]), &targets).is_none());
        assert!(find_closest_match(&v(&[1.0, 0.0]), &targets, -1.0).is_none());
    }

    #[test]
    fn test_nan_is_skipped_among_valid_targets() {
        let targets = vec![v(&[0.0, 0.0]), v(&[1.0, 0.0])];
        let m = find_closest_match(&v(&[1.0, 0.0]), &targets, 0.5).unwrap();
        assert_eq!(m.index, 1);
    }

    #[test]
    fn test_empty_targets() {
        assert!(find_closest_match(&v(&[1.0]), &[], -1.0).is_none());
    }

    #[test]
    fn test_assign_allows_many_to_one() {
        let matcher = Matcher::new(0.5);
        let sources = vec![v(&[1.0, 0.0]), v(&[0.9, 0.1]), v(&[0.0, 1.0])];
        let targets = vec![v(&[1.0, 0.0]), v(&[-1.0, -1.0])];

        let candidates = matcher.assign(&sources, &targets);
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].matched().map(|m| m.index), Some(0));
        assert_eq!(candidates[1].matched().map(|m| m.index), Some(0));

        // orthogonal to target 0, opposed-ish to target 1
        assert!(!candidates[2].accepted);
        assert!(candidates[2].matched().is_none());
        assert!(candidates[2].best.is_some());
    }

    #[test]
    fn test_assign_agrees_with_find_closest_match() {
        let sources = vec![v(&[1.0, 0.0]), v(&[1.0, 1.0]), v(&[0.0, 0.0]), v(&[-1.0, 0.2])];
        let targets = vec![v(&[0.0, 1.0]), v(&[1.0, 0.2])];

        for threshold in [-1.0, 0.0, 0.5, 0.7071, 0.9, 1.0] {
            let candidates = Matcher::new(threshold).assign(&sources, &targets);
            for (source, candidate) in sources.iter().zip(&candidates) {
                assert_eq!(
                    candidate.matched(),
                    find_closest_match(source, &targets, threshold),
                    "threshold {threshold}"
                );
            }
        }
    }

    #[test]
    fn test_default_threshold() {
        assert_eq!(Matcher::default().threshold(), DEFAULT_SIMILARITY_THRESHOLD);
        assert_eq!(DEFAULT_SIMILARITY_THRESHOLD, 0.5);
    }
}
