//! Conversation session history.
//!
//! An append-only sequence of (query, answer) exchanges, owned by the host
//! session. Turns within one session never overlap, so no synchronization is
//! needed here.

use crate::types::{Answer, Query};

/// One completed query/answer pair.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub query: Query,
    pub answer: Answer,
}

/// Append-only conversation history.
#[derive(Debug, Default)]
pub struct Session {
    exchanges: Vec<Exchange>,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed exchange.
    pub fn push(&mut self, query: Query, answer: Answer) {
        self.exchanges.push(Exchange { query, answer });
    }

    /// Number of exchanges so far.
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    /// Whether any exchange has happened.
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// The most recent exchange, if any.
    pub fn last(&self) -> Option<&Exchange> {
        self.exchanges.last()
    }

    /// Iterate over exchanges in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Route, RouteDecision};

    fn answer(text: &str) -> Answer {
        Answer {
            text: text.to_string(),
            citations: Vec::new(),
            decision: RouteDecision::new(Route::ModelOnly, "test".to_string()),
            latency_ms: 1,
            backend: "test/model".to_string(),
        }
    }

    #[test]
    fn test_session_appends_in_order() {
        let mut session = Session::new();
        assert!(session.is_empty());

        session.push(Query::new("first?").unwrap(), answer("one"));
        session.push(Query::new("second?").unwrap(), answer("two"));

        assert_eq!(session.len(), 2);
        assert_eq!(session.last().unwrap().answer.text, "two");

        let queries: Vec<&str> = session.iter().map(|e| e.query.text()).collect();
        assert_eq!(queries, vec!["first?", "second?"]);
    }
}
