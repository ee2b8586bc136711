//! Query expansion.
//!
//! Widens recall for domain phrasings the embedding model may not map close
//! together. The table is configuration; an empty table means the query is
//! searched verbatim.

use std::collections::HashMap;

/// Expands a query into synonymous phrasings using a configured table.
#[derive(Debug, Clone, Default)]
pub struct QueryExpander {
    expansions: HashMap<String, Vec<String>>,
}

impl QueryExpander {
    /// Create an expander from a phrase -> synonyms table.
    ///
    /// Keys are matched case-insensitively as substrings of the query.
    pub fn new(expansions: HashMap<String, Vec<String>>) -> Self {
        let expansions = expansions
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        Self { expansions }
    }

    /// Expand a query into itself plus any configured synonyms.
    ///
    /// The original query always comes first; duplicates are dropped.
    pub fn expand(&self, query: &str) -> Vec<String> {
        let lowered = query.to_lowercase();
        let mut expanded = vec![query.to_string()];

        for (key, synonyms) in &self.expansions {
            if lowered.contains(key) {
                for synonym in synonyms {
                    if !expanded.iter().any(|q| q == synonym) {
                        expanded.push(synonym.clone());
                    }
                }
            }
        }

        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expander() -> QueryExpander {
        let mut table = HashMap::new();
        table.insert(
            "drug discovery".to_string(),
            vec![
                "machine learning drug discovery".to_string(),
                "de novo molecule design".to_string(),
            ],
        );
        QueryExpander::new(table)
    }

    #[test]
    fn test_no_match_returns_query_only() {
        let expanded = expander().expand("What is RAG?");
        assert_eq!(expanded, vec!["What is RAG?".to_string()]);
    }

    #[test]
    fn test_match_appends_synonyms() {
        let expanded = expander().expand("Explain AI-driven Drug Discovery");
        assert_eq!(expanded.len(), 3);
        assert_eq!(expanded[0], "Explain AI-driven Drug Discovery");
        assert!(expanded.contains(&"de novo molecule design".to_string()));
    }

    #[test]
    fn test_empty_table() {
        let expander = QueryExpander::default();
        assert_eq!(expander.expand("anything"), vec!["anything".to_string()]);
    }
}
