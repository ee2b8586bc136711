//! The unified evidence model.
//!
//! A retrieved unit is an `EvidenceItem` regardless of where it came from;
//! the origin carries the source identity. Relevance scores are comparable
//! only within a single retrieval batch of the same kind — local similarity
//! scores and web provider scores are never compared against each other.

use serde::{Deserialize, Serialize};

/// Where a piece of evidence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// A chunk of a privately indexed document
    LocalDocument,

    /// A live web search result
    Web,
}

/// Source identity of a retrieved unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EvidenceOrigin {
    /// Document name plus chunk index within that document
    Document { name: String, chunk: usize },

    /// Web result URL
    Web { url: String },
}

impl EvidenceOrigin {
    /// The source kind this origin belongs to.
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Document { .. } => SourceKind::LocalDocument,
            Self::Web { .. } => SourceKind::Web,
        }
    }

    /// The citation reference: document name or URL.
    pub fn reference(&self) -> &str {
        match self {
            Self::Document { name, .. } => name,
            Self::Web { url } => url,
        }
    }

    /// Human-readable display label.
    pub fn label(&self) -> String {
        match self {
            Self::Document { name, chunk } => format!("{} (chunk {})", name, chunk),
            Self::Web { url } => url.clone(),
        }
    }
}

/// A single retrieved unit offered to the synthesizer as grounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Source identity
    pub origin: EvidenceOrigin,

    /// Raw text snippet as returned by the adapter
    pub snippet: String,

    /// Relevance score; same-batch comparable only
    pub score: f32,

    /// Rank within its retrieval batch (0 = best)
    pub rank: usize,
}

impl EvidenceItem {
    /// The source kind of this item.
    pub fn kind(&self) -> SourceKind {
        self.origin.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_labels() {
        let doc = EvidenceOrigin::Document {
            name: "handbook.pdf".to_string(),
            chunk: 3,
        };
        assert_eq!(doc.reference(), "handbook.pdf");
        assert_eq!(doc.label(), "handbook.pdf (chunk 3)");
        assert_eq!(doc.kind(), SourceKind::LocalDocument);

        let web = EvidenceOrigin::Web {
            url: "https://example.com/a".to_string(),
        };
        assert_eq!(web.reference(), "https://example.com/a");
        assert_eq!(web.kind(), SourceKind::Web);
    }

    #[test]
    fn test_item_kind() {
        let item = EvidenceItem {
            origin: EvidenceOrigin::Web {
                url: "https://example.com".to_string(),
            },
            snippet: "text".to_string(),
            score: 0.5,
            rank: 0,
        };
        assert_eq!(item.kind(), SourceKind::Web);
    }
}
