//! Embedding provider boundary.

use crate::error::{Error, Result};
use crate::vector::Vector;
use async_trait::async_trait;

/// Turns a batch of strings into one embedding vector per string.
///
/// Implementations must return exactly `texts.len()` vectors, in input order,
/// whatever their transport strategy (one batched request or one request per
/// text). Failures surface as [`Error::Provider`]; the caller never retries.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short provider identifier, e.g. `"cohere"`.
    fn name(&self) -> &str;

    /// Model used for every request.
    fn model(&self) -> &str;

    /// Embed `texts`, preserving order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vector>>;
}

/// Check that a provider answered with one vector per input.
pub fn ensure_batch_len(provider: &str, expected: usize, vectors: &[Vector]) -> Result<()> {
    if vectors.len() != expected {
        return Err(Error::provider(
            provider,
            format!(
                "expected {} embeddings, received {}",
                expected,
                vectors.len()
            ),
        ));
    }
    Ok(())
}

/// Check that every vector in the batches shares one dimensionality.
///
/// Returns the common dimension, or `None` if there are no vectors at all.
pub fn ensure_uniform_dim<'a, I>(vectors: I) -> Result<Option<usize>>
where
    I: IntoIterator<Item = &'a Vector>,
{
    let mut expected: Option<usize> = None;
    for vector in vectors {
        match expected {
            None => expected = Some(vector.dim()),
            Some(dim) if dim != vector.dim() => {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    actual: vector.dim(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_batch_len() {
        let vectors = vec![Vector::new(vec![1.0]), Vector::new(vec![2.0])];
        assert!(ensure_batch_len("fake", 2, &vectors).is_ok());
        match ensure_batch_len("fake", 3, &vectors) {
            Err(Error::Provider { provider, message }) => {
                assert_eq!(provider, "fake");
                assert!(message.contains("expected 3"));
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[test]
    fn test_ensure_uniform_dim() {
        let a = vec![Vector::new(vec![1.0, 2.0]), Vector::new(vec![0.0, 1.0])];
        let b = vec![Vector::new(vec![1.0, 2.0, 3.0])];

        assert_eq!(ensure_uniform_dim(a.iter()).unwrap(), Some(2));
        assert_eq!(ensure_uniform_dim(std::iter::empty()).unwrap(), None);
        assert!(matches!(
            ensure_uniform_dim(a.iter().chain(b.iter())),
            Err(Error::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }
}
