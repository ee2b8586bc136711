//! Core turn types: queries, routes, citations, answers.

use askroute_core::{AppError, AppResult};
use askroute_retrieval::EvidenceItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum snippet length carried on a citation for display.
const MAX_CITATION_SNIPPET: usize = 150;

/// An incoming question. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Query {
    text: String,
    asked_at: DateTime<Utc>,
}

impl Query {
    /// Create a query, rejecting empty or whitespace-only text before any
    /// adapter is ever involved.
    pub fn new(text: impl Into<String>) -> AppResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(AppError::InvalidQuery(
                "query text is empty or whitespace-only".to_string(),
            ));
        }
        Ok(Self {
            text,
            asked_at: Utc::now(),
        })
    }

    /// The raw query text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Arrival timestamp.
    pub fn asked_at(&self) -> DateTime<Utc> {
        self.asked_at
    }
}

/// The knowledge-source strategy chosen for a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    /// Answered from the private document store
    LocalRag,

    /// Answered from live web search results
    WebFallback,

    /// Answered from model knowledge alone
    ModelOnly,
}

impl Route {
    /// Canonical route name for records and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocalRag => "local-rag",
            Self::WebFallback => "web-fallback",
            Self::ModelOnly => "model-only",
        }
    }
}

/// A route plus the reason it was chosen.
///
/// The reason is part of the audit trail: degradations ("store timed out",
/// "web search returned no results") are recorded here, never discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub route: Route,
    pub reason: String,
}

impl RouteDecision {
    /// Create a decision with its reason.
    pub fn new(route: Route, reason: impl Into<String>) -> Self {
        Self {
            route,
            reason: reason.into(),
        }
    }
}

/// A user-facing reference to evidence that grounded an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Display label (e.g., "handbook.pdf (chunk 3)" or a URL)
    pub label: String,

    /// The reference itself: document name or URL
    pub reference: String,

    /// Short snippet of the bound evidence, truncated for display
    pub snippet: String,
}

impl Citation {
    /// Derive a citation from an evidence item that was actually included in
    /// the prompt. Citations are only ever built this way, which is what
    /// keeps fabricated references structurally impossible.
    pub fn from_evidence(item: &EvidenceItem) -> Self {
        Self {
            label: item.origin.label(),
            reference: item.origin.reference().to_string(),
            snippet: truncate_snippet(&item.snippet, MAX_CITATION_SNIPPET),
        }
    }
}

/// A synthesized answer with its full audit context.
///
/// Never mutated after construction; the cache and recorder hand out clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Final answer text
    pub text: String,

    /// Citations in the order their evidence appeared in the prompt.
    /// Empty if and only if the route is `ModelOnly`.
    pub citations: Vec<Citation>,

    /// The route taken and why
    pub decision: RouteDecision,

    /// Synthesis latency in milliseconds
    pub latency_ms: u64,

    /// Generation backend identity, "provider/model"
    pub backend: String,
}

/// The result of one turn, as seen by the host.
///
/// `cache_hit` lives here rather than on the Answer: a cached Answer is
/// returned byte-identical, so the hit/miss distinction must not leak into it.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub answer: Answer,
    pub cache_hit: bool,
    pub latency_ms: u64,
}

/// Truncate a snippet at a character budget, breaking at a word boundary.
pub(crate) fn truncate_snippet(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let truncated: String = text.chars().take(max_chars).collect();
    match truncated.rfind(char::is_whitespace) {
        Some(last_space) => format!("{}...", &truncated[..last_space]),
        None => format!("{}...", truncated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askroute_retrieval::EvidenceOrigin;

    #[test]
    fn test_query_rejects_blank_text() {
        assert!(matches!(Query::new(""), Err(AppError::InvalidQuery(_))));
        assert!(matches!(Query::new("   \t"), Err(AppError::InvalidQuery(_))));
        assert!(Query::new("What is RAG?").is_ok());
    }

    #[test]
    fn test_route_names() {
        assert_eq!(Route::LocalRag.as_str(), "local-rag");
        assert_eq!(Route::WebFallback.as_str(), "web-fallback");
        assert_eq!(Route::ModelOnly.as_str(), "model-only");
    }

    #[test]
    fn test_citation_from_evidence() {
        let item = EvidenceItem {
            origin: EvidenceOrigin::Document {
                name: "handbook.pdf".to_string(),
                chunk: 3,
            },
            snippet: "Leave requests go through the portal.".to_string(),
            score: 0.9,
            rank: 0,
        };

        let citation = Citation::from_evidence(&item);
        assert_eq!(citation.label, "handbook.pdf (chunk 3)");
        assert_eq!(citation.reference, "handbook.pdf");
        assert_eq!(citation.snippet, "Leave requests go through the portal.");
    }

    #[test]
    fn test_truncate_snippet() {
        let short = "Short text";
        assert_eq!(truncate_snippet(short, 100), "Short text");

        let long = "This is a very long text that needs to be truncated at some point";
        let result = truncate_snippet(long, 30);
        assert!(result.chars().count() <= 33);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_truncate_snippet_multibyte() {
        let text = "héllo wörld çafé théré wörds hére and more words after that";
        let result = truncate_snippet(text, 20);
        assert!(result.ends_with("..."));
    }
}
