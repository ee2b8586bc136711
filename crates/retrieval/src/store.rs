//! Evidence store abstraction.
//!
//! The private document index is a black box behind this trait: ingestion,
//! chunking, and embedding all happen elsewhere. The core only ever issues
//! similarity searches.

use crate::evidence::EvidenceItem;
use askroute_core::AppResult;

/// Trait for vector store backends.
///
/// `search` returns items ordered by descending relevance, ranked within the
/// batch. Implementations surface internal errors as `AppError::Retrieval`;
/// the router treats any error as zero evidence rather than failing the turn.
#[async_trait::async_trait]
pub trait EvidenceStore: Send + Sync {
    /// Search for the top-k most relevant chunks for the query text.
    async fn search(&self, query: &str, k: usize) -> AppResult<Vec<EvidenceItem>>;
}
