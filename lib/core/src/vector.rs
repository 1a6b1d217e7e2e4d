use serde::{Deserialize, Serialize};

/// An embedding vector produced by an [`EmbeddingProvider`](crate::EmbeddingProvider)
/// for one leaf path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn from_slice(data: &[f32]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }

    /// Cosine similarity with another vector.
    ///
    /// Returns `NaN` when either vector has zero magnitude or the dimensions
    /// differ. `NaN` never beats another score in the matcher, so such pairs
    /// are never matched.
    #[inline]
    pub fn cosine_similarity(&self, other: &Vector) -> f32 {
        cosine_similarity(&self.data, &other.data)
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}

/// Dot product divided by the product of magnitudes.
///
/// The fast path works in `f32`. Squared magnitudes leave the `f32` range for
/// components far from 1 (roughly above 1e19 or below 1e-19), so those inputs
/// are recomputed with `f64` accumulators.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::NAN;
    }

    let aa = crate::simd::dot_product(a, a);
    let bb = crate::simd::dot_product(b, b);
    if aa.is_normal() && bb.is_normal() {
        let denominator = aa.sqrt() * bb.sqrt();
        let ab = crate::simd::dot_product(a, b);
        if denominator.is_normal() && ab.is_finite() {
            // Rounding can push parallel vectors a hair past the cosine range.
            return (ab / denominator).clamp(-1.0, 1.0);
        }
    }

    cosine_similarity_wide(a, b)
}

fn cosine_similarity_wide(a: &[f32], b: &[f32]) -> f32 {
    let (mut ab, mut aa, mut bb) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        ab += x * y;
        aa += x * x;
        bb += y * y;
    }

    let denominator = aa.sqrt() * bb.sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return f32::NAN;
    }
    ((ab / denominator) as f32).clamp(-1.0, 1.0)
}
