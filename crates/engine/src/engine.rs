//! Turn orchestration.
//!
//! One `Engine` wires the cache, router, synthesizer, and sinks together and
//! runs a query through the whole control flow: cache lookup, routing,
//! synthesis, cache write, record emission. Router, gate, and synthesizer are
//! stateless; the cache is the only shared mutable resource, so one engine
//! can serve concurrent sessions.

use crate::cache::ResponseCache;
use crate::recorder::{InteractionSink, TurnRecord};
use crate::router::Router;
use crate::synthesizer::Synthesizer;
use crate::types::{Query, TurnOutcome};
use askroute_core::AppResult;
use std::sync::Arc;
use std::time::Instant;

/// The assistant core: one instance handles turns for any number of sessions.
pub struct Engine {
    router: Router,
    synthesizer: Synthesizer,
    cache: ResponseCache,
    sinks: Vec<Arc<dyn InteractionSink>>,
}

impl Engine {
    /// Create an engine over its components.
    pub fn new(router: Router, synthesizer: Synthesizer, cache: ResponseCache) -> Self {
        Self {
            router,
            synthesizer,
            cache,
            sinks: Vec::new(),
        }
    }

    /// Attach an interaction sink. Sinks receive one record per completed
    /// turn; sink failures are logged and never fail the turn.
    pub fn with_sink(mut self, sink: Arc<dyn InteractionSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// The response cache, for host inspection.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Run one turn to completion.
    ///
    /// A cache hit bypasses routing and synthesis entirely and returns the
    /// cached Answer unchanged. Generation failure surfaces as
    /// `AppError::GenerationUnavailable` and nothing is cached for the query.
    pub async fn handle(&self, query: &Query) -> AppResult<TurnOutcome> {
        let start = Instant::now();

        if let Some(answer) = self.cache.get(query.text()) {
            tracing::info!("Cache hit; bypassing router and synthesizer");
            let outcome = TurnOutcome {
                answer,
                cache_hit: true,
                latency_ms: start.elapsed().as_millis() as u64,
            };
            self.emit(query, &outcome);
            return Ok(outcome);
        }

        let routed = self.router.route(query.text()).await;
        let answer = self.synthesizer.synthesize(query, &routed).await?;

        self.cache.put(query.text(), answer.clone());

        let outcome = TurnOutcome {
            answer,
            cache_hit: false,
            latency_ms: start.elapsed().as_millis() as u64,
        };
        self.emit(query, &outcome);

        Ok(outcome)
    }

    /// Emit the turn record to every sink.
    fn emit(&self, query: &Query, outcome: &TurnOutcome) {
        let record = TurnRecord::from_turn(query, outcome);
        for sink in &self.sinks {
            if let Err(e) = sink.record(&record) {
                tracing::warn!("Interaction sink failed: {}", e);
            }
        }
    }
}
