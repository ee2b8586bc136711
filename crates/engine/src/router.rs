//! The routing state machine.
//!
//! Selects among {local-RAG, web-fallback, model-only} by walking an explicit
//! state machine: Start -> LocalAttempted -> (Done | WebAttempted) -> Done.
//! Adapter failures and timeouts degrade to empty evidence and are recorded
//! as the route's degradation reason; they never crash the turn. The router
//! never retries an adapter within a turn, which keeps routing latency
//! bounded and deterministic given adapter responses.

use crate::gate::RelevanceGate;
use crate::types::{Route, RouteDecision};
use askroute_retrieval::{EvidenceItem, EvidenceStore, QueryExpander, WebSearch};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Router tunables.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Top-k chunks requested from the evidence store
    pub top_k: usize,

    /// Per-adapter-call timeout
    pub timeout: Duration,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            top_k: 4,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Terminal routing result: the decision plus the evidence set used.
#[derive(Debug, Clone)]
pub struct Routed {
    pub decision: RouteDecision,
    pub evidence: Vec<EvidenceItem>,
}

/// Router states. Evidence gathered along the way travels inside the state.
enum RouterState {
    Start,
    LocalAttempted {
        evidence: Vec<EvidenceItem>,
        degradation: Option<String>,
    },
    WebAttempted {
        local_reason: String,
        evidence: Vec<EvidenceItem>,
        degradation: Option<String>,
    },
    Done(Routed),
}

/// The decision state machine over knowledge sources.
pub struct Router {
    store: Arc<dyn EvidenceStore>,
    web: Arc<dyn WebSearch>,
    gate: RelevanceGate,
    expander: QueryExpander,
    options: RouterOptions,
}

impl Router {
    /// Create a router over the given adapters.
    pub fn new(
        store: Arc<dyn EvidenceStore>,
        web: Arc<dyn WebSearch>,
        gate: RelevanceGate,
        expander: QueryExpander,
        options: RouterOptions,
    ) -> Self {
        Self {
            store,
            web,
            gate,
            expander,
            options,
        }
    }

    /// Route a query to its knowledge source.
    ///
    /// Infallible by design: every adapter failure degrades, and the terminal
    /// state always carries exactly one RouteDecision.
    pub async fn route(&self, query: &str) -> Routed {
        let mut state = RouterState::Start;

        loop {
            state = match state {
                RouterState::Start => {
                    let (evidence, degradation) = self.attempt_local(query).await;
                    RouterState::LocalAttempted {
                        evidence,
                        degradation,
                    }
                }

                RouterState::LocalAttempted {
                    evidence,
                    degradation,
                } => {
                    if self.gate.is_sufficient(&evidence) {
                        let best = self.gate.best_score(&evidence).unwrap_or(0.0);
                        let reason = format!(
                            "max local score {:.3} at or above threshold {:.2}",
                            best,
                            self.gate.threshold()
                        );
                        tracing::info!(route = "local-rag", %reason, "routing decided");
                        RouterState::Done(Routed {
                            decision: RouteDecision::new(Route::LocalRag, reason),
                            evidence,
                        })
                    } else {
                        let local_reason = self.describe_insufficiency(&evidence, degradation);
                        tracing::info!(%local_reason, "local evidence insufficient, trying web");
                        let (web_evidence, web_degradation) = self.attempt_web(query).await;
                        RouterState::WebAttempted {
                            local_reason,
                            evidence: web_evidence,
                            degradation: web_degradation,
                        }
                    }
                }

                RouterState::WebAttempted {
                    local_reason,
                    evidence,
                    degradation,
                } => {
                    if evidence.is_empty() {
                        let web_reason = degradation
                            .unwrap_or_else(|| "web search returned no results".to_string());
                        let reason = format!("{}; {}", local_reason, web_reason);
                        tracing::info!(route = "model-only", %reason, "routing decided");
                        RouterState::Done(Routed {
                            decision: RouteDecision::new(Route::ModelOnly, reason),
                            evidence: Vec::new(),
                        })
                    } else {
                        let reason = format!("{}; answering from web results", local_reason);
                        tracing::info!(route = "web-fallback", %reason, "routing decided");
                        RouterState::Done(Routed {
                            decision: RouteDecision::new(Route::WebFallback, reason),
                            evidence,
                        })
                    }
                }

                RouterState::Done(routed) => return routed,
            };
        }
    }

    /// Query the evidence store with each expansion of the query, merging
    /// results and deduplicating by origin. Store return order is preserved
    /// (first-returned wins on score ties), and ranks are reassigned over the
    /// merged batch. Failures and timeouts yield empty evidence plus a
    /// degradation note.
    async fn attempt_local(&self, query: &str) -> (Vec<EvidenceItem>, Option<String>) {
        let mut merged: Vec<EvidenceItem> = Vec::new();
        let mut degradation = None;

        for expanded in self.expander.expand(query) {
            match timeout(
                self.options.timeout,
                self.store.search(&expanded, self.options.top_k),
            )
            .await
            {
                Ok(Ok(items)) => {
                    for item in items {
                        if !merged.iter().any(|seen| seen.origin == item.origin) {
                            merged.push(item);
                        }
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!("Evidence store failed: {}", e);
                    degradation.get_or_insert(format!("local retrieval unavailable: {}", e));
                }
                Err(_) => {
                    tracing::warn!(
                        "Evidence store timed out after {:?}",
                        self.options.timeout
                    );
                    degradation.get_or_insert(format!(
                        "local retrieval timed out after {}s",
                        self.options.timeout.as_secs()
                    ));
                }
            }
        }

        for (rank, item) in merged.iter_mut().enumerate() {
            item.rank = rank;
        }

        (merged, degradation)
    }

    /// Single web search attempt; failures and timeouts yield empty evidence
    /// plus a degradation note.
    async fn attempt_web(&self, query: &str) -> (Vec<EvidenceItem>, Option<String>) {
        match timeout(self.options.timeout, self.web.search(query)).await {
            Ok(Ok(items)) => (items, None),
            Ok(Err(e)) => {
                tracing::warn!("Web search failed: {}", e);
                (Vec::new(), Some(format!("web search unavailable: {}", e)))
            }
            Err(_) => {
                tracing::warn!("Web search timed out after {:?}", self.options.timeout);
                (
                    Vec::new(),
                    Some(format!(
                        "web search timed out after {}s",
                        self.options.timeout.as_secs()
                    )),
                )
            }
        }
    }

    /// Describe why local evidence did not pass the gate.
    fn describe_insufficiency(
        &self,
        evidence: &[EvidenceItem],
        degradation: Option<String>,
    ) -> String {
        if let Some(note) = degradation {
            if evidence.is_empty() {
                return note;
            }
        }

        match self.gate.best_score(evidence) {
            Some(best) => format!(
                "max local score {:.3} below threshold {:.2}",
                best,
                self.gate.threshold()
            ),
            None => "local retrieval returned no results".to_string(),
        }
    }
}
