//! Relevance gate: is local evidence trustworthy enough to answer from?
//!
//! Pure and side-effect-free; scores are compared only within the retrieval
//! batch they came from. No cross-batch renormalization is assumed.

use askroute_retrieval::EvidenceItem;

/// Thresholds a batch of local evidence against a configured minimum score.
#[derive(Debug, Clone, Copy)]
pub struct RelevanceGate {
    threshold: f32,
}

impl RelevanceGate {
    /// Create a gate with the configured threshold (τ).
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// The configured threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Highest relevance score in the batch, or None for an empty batch.
    pub fn best_score(&self, items: &[EvidenceItem]) -> Option<f32> {
        items
            .iter()
            .map(|item| item.score)
            .fold(None, |best, score| match best {
                None => Some(score),
                Some(current) => Some(current.max(score)),
            })
    }

    /// Local evidence is sufficient iff the batch is non-empty and at least
    /// one item scores at or above the threshold.
    pub fn is_sufficient(&self, items: &[EvidenceItem]) -> bool {
        self.best_score(items)
            .map_or(false, |best| best >= self.threshold)
    }
}
