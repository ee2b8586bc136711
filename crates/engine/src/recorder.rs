//! Interaction records.
//!
//! Every turn emits one structured record (query, chosen route, sources,
//! latency, cache hit) for auditability. The engine emits records to any
//! number of sinks; persistence format is the sink's concern, not the core's.

use crate::types::{Query, Route, TurnOutcome};
use askroute_core::AppResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A structured record of one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    /// Unique turn id
    pub id: String,

    /// Record creation time
    pub timestamp: DateTime<Utc>,

    /// Raw query text
    pub query: String,

    /// Route taken
    pub route: Route,

    /// Why the route was taken (including any degradation)
    pub reason: String,

    /// Citation references (document names or URLs), in answer order
    pub citations: Vec<String>,

    /// End-to-end turn latency in milliseconds
    pub latency_ms: u64,

    /// Whether the answer came from the response cache
    pub cache_hit: bool,

    /// Generation backend identity
    pub backend: String,
}

impl TurnRecord {
    /// Build a record from a completed turn.
    pub fn from_turn(query: &Query, outcome: &TurnOutcome) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            query: query.text().to_string(),
            route: outcome.answer.decision.route,
            reason: outcome.answer.decision.reason.clone(),
            citations: outcome
                .answer
                .citations
                .iter()
                .map(|c| c.reference.clone())
                .collect(),
            latency_ms: outcome.latency_ms,
            cache_hit: outcome.cache_hit,
            backend: outcome.answer.backend.clone(),
        }
    }
}

/// Consumer of turn records.
///
/// Sink failures must never fail a turn; the engine logs and moves on.
pub trait InteractionSink: Send + Sync {
    /// Record one turn.
    fn record(&self, record: &TurnRecord) -> AppResult<()>;
}

/// Sink that emits records to the tracing subscriber.
#[derive(Debug, Default)]
pub struct TracingSink;

impl InteractionSink for TracingSink {
    fn record(&self, record: &TurnRecord) -> AppResult<()> {
        tracing::info!(
            turn = %record.id,
            route = record.route.as_str(),
            reason = %record.reason,
            citations = record.citations.len(),
            latency_ms = record.latency_ms,
            cache_hit = record.cache_hit,
            backend = %record.backend,
            "turn completed"
        );
        Ok(())
    }
}
