//! Web search fallback adapter.
//!
//! Wraps the Tavily search API. Results carry the provider's own relevance
//! score and rank; these are never compared against local similarity scores.

use crate::evidence::{EvidenceItem, EvidenceOrigin};
use askroute_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Trait for web search providers.
///
/// `search` returns items in provider-assigned rank order. Implementations
/// surface errors (network, quota, timeout) as `AppError::WebSearch`; the
/// router treats any error as zero evidence rather than failing the turn.
#[async_trait::async_trait]
pub trait WebSearch: Send + Sync {
    /// Search the web for the query text.
    async fn search(&self, query: &str) -> AppResult<Vec<EvidenceItem>>;
}

/// Tavily API request format.
#[derive(Debug, Serialize)]
struct TavilyRequest {
    api_key: String,
    query: String,
    search_depth: &'static str,
    max_results: usize,
}

/// Tavily API response format.
#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    score: f32,
}

/// Web search client backed by the Tavily API.
pub struct TavilySearch {
    /// Search endpoint URL
    endpoint: String,

    /// API key
    api_key: String,

    /// Maximum results per search
    max_results: usize,

    /// HTTP client
    client: reqwest::Client,
}

impl TavilySearch {
    /// Create a new Tavily client.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, max_results: usize) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            max_results,
            client: reqwest::Client::new(),
        }
    }

    /// Convert one Tavily result into an EvidenceItem.
    fn convert_result(rank: usize, result: TavilyResult) -> EvidenceItem {
        let snippet = if result.title.is_empty() {
            result.content
        } else {
            format!("{}\n{}", result.title, result.content)
        };

        EvidenceItem {
            origin: EvidenceOrigin::Web { url: result.url },
            snippet,
            score: result.score,
            rank,
        }
    }
}

#[async_trait::async_trait]
impl WebSearch for TavilySearch {
    async fn search(&self, query: &str) -> AppResult<Vec<EvidenceItem>> {
        tracing::debug!("Searching the web (max_results={})", self.max_results);

        let request = TavilyRequest {
            api_key: self.api_key.clone(),
            query: query.to_string(),
            search_depth: "advanced",
            max_results: self.max_results,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::WebSearch(format!("Failed to reach search provider: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::WebSearch(format!(
                "Search provider error ({}): {}",
                status, error_text
            )));
        }

        let tavily_response: TavilyResponse = response
            .json()
            .await
            .map_err(|e| AppError::WebSearch(format!("Failed to parse search response: {}", e)))?;

        let items: Vec<EvidenceItem> = tavily_response
            .results
            .into_iter()
            .enumerate()
            .map(|(rank, result)| Self::convert_result(rank, result))
            .collect();

        tracing::debug!("Web search returned {} results", items.len());

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_result_with_title() {
        let result = TavilyResult {
            title: "RAG explained".to_string(),
            url: "https://example.com/rag".to_string(),
            content: "Retrieval-augmented generation...".to_string(),
            score: 0.91,
        };

        let item = TavilySearch::convert_result(0, result);
        assert_eq!(
            item.origin,
            EvidenceOrigin::Web {
                url: "https://example.com/rag".to_string()
            }
        );
        assert!(item.snippet.starts_with("RAG explained\n"));
        assert_eq!(item.score, 0.91);
        assert_eq!(item.rank, 0);
    }

    #[test]
    fn test_convert_result_without_title() {
        let result = TavilyResult {
            title: String::new(),
            url: "https://example.com".to_string(),
            content: "body only".to_string(),
            score: 0.4,
        };

        let item = TavilySearch::convert_result(1, result);
        assert_eq!(item.snippet, "body only");
        assert_eq!(item.rank, 1);
    }
}
