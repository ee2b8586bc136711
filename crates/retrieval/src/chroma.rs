//! Chroma-backed evidence store adapter.
//!
//! Queries a Chroma HTTP service for similar chunks. Chroma reports cosine
//! distances; these are mapped to a similarity in [0, 1] via `1 - d/2` so the
//! relevance gate can threshold them.

use crate::evidence::{EvidenceItem, EvidenceOrigin};
use crate::store::EvidenceStore;
use askroute_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Chroma query request format.
#[derive(Debug, Serialize)]
struct ChromaQueryRequest {
    query_texts: Vec<String>,
    n_results: usize,
    include: Vec<&'static str>,
}

/// Chroma query response format.
///
/// Result arrays are nested per input query; we always send exactly one.
#[derive(Debug, Deserialize)]
struct ChromaQueryResponse {
    #[serde(default)]
    documents: Vec<Vec<String>>,
    #[serde(default)]
    metadatas: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    distances: Vec<Vec<f32>>,
}

/// Evidence store backed by a Chroma collection over HTTP.
pub struct ChromaStore {
    /// Base URL of the Chroma service
    base_url: String,

    /// Collection name
    collection: String,

    /// HTTP client
    client: reqwest::Client,
}

impl ChromaStore {
    /// Create a new store adapter for a collection.
    pub fn new(base_url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            collection: collection.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Convert cosine distance to a similarity score clamped to [0, 1].
    fn distance_to_similarity(distance: f32) -> f32 {
        (1.0 - distance / 2.0).clamp(0.0, 1.0)
    }

    /// Convert one Chroma result row into an EvidenceItem.
    fn convert_hit(
        rank: usize,
        document: &str,
        metadata: &serde_json::Value,
        distance: f32,
    ) -> EvidenceItem {
        let name = metadata
            .get("source")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();

        let chunk = metadata
            .get("chunk")
            .and_then(|v| v.as_u64())
            .unwrap_or(rank as u64) as usize;

        EvidenceItem {
            origin: EvidenceOrigin::Document { name, chunk },
            snippet: document.to_string(),
            score: Self::distance_to_similarity(distance),
            rank,
        }
    }
}

#[async_trait::async_trait]
impl EvidenceStore for ChromaStore {
    async fn search(&self, query: &str, k: usize) -> AppResult<Vec<EvidenceItem>> {
        tracing::debug!("Querying Chroma collection '{}' (k={})", self.collection, k);

        let request = ChromaQueryRequest {
            query_texts: vec![query.to_string()],
            n_results: k,
            include: vec!["documents", "metadatas", "distances"],
        };

        let url = format!(
            "{}/api/v1/collections/{}/query",
            self.base_url, self.collection
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to reach vector store: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Retrieval(format!(
                "Vector store error ({}): {}",
                status, error_text
            )));
        }

        let chroma_response: ChromaQueryResponse = response
            .json()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to parse store response: {}", e)))?;

        // Rows are parallel arrays for the single query we sent; Chroma
        // already orders them by ascending distance.
        let documents = chroma_response.documents.into_iter().next().unwrap_or_default();
        let metadatas = chroma_response.metadatas.into_iter().next().unwrap_or_default();
        let distances = chroma_response.distances.into_iter().next().unwrap_or_default();

        let items: Vec<EvidenceItem> = documents
            .iter()
            .enumerate()
            .map(|(rank, doc)| {
                let metadata = metadatas.get(rank).cloned().unwrap_or(serde_json::Value::Null);
                let distance = distances.get(rank).copied().unwrap_or(2.0);
                Self::convert_hit(rank, doc, &metadata, distance)
            })
            .collect();

        tracing::debug!("Vector store returned {} chunks", items.len());

        Ok(items)
    }
}
