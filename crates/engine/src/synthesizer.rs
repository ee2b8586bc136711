//! Answer synthesis.
//!
//! Builds the final prompt (instruction header, source-labeled evidence,
//! question), invokes the generation backend exactly once, and binds
//! citations to everything the prompt actually included. Stateless and
//! repeatable: the backend may be non-deterministic, but identical
//! (query, route, evidence) inputs always produce the same citation set.

use crate::router::Routed;
use crate::types::{truncate_snippet, Answer, Citation, Query, Route};
use askroute_core::{AppError, AppResult};
use askroute_llm::{GenerationClient, GenerationRequest};
use askroute_retrieval::EvidenceItem;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Synthesizer tunables.
#[derive(Debug, Clone)]
pub struct SynthesizerOptions {
    /// Model identifier passed to the backend
    pub model: String,

    /// Sampling temperature; low for factual answering
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Hard per-item character budget for evidence snippets
    pub item_budget: usize,

    /// Total character budget for the evidence section; lowest-ranked items
    /// past this point are dropped entirely and therefore not cited
    pub context_budget: usize,

    /// Generation timeout
    pub timeout: Duration,
}

impl Default for SynthesizerOptions {
    fn default() -> Self {
        Self {
            model: "llama3.2".to_string(),
            temperature: 0.3,
            max_tokens: 1000,
            item_budget: 800,
            context_budget: 4000,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Turns routed evidence into a cited answer via one backend call.
pub struct Synthesizer {
    client: Arc<dyn GenerationClient>,
    options: SynthesizerOptions,
}

impl Synthesizer {
    /// Create a synthesizer over a generation backend.
    pub fn new(client: Arc<dyn GenerationClient>, options: SynthesizerOptions) -> Self {
        Self { client, options }
    }

    /// Synthesize an answer for a routed query.
    ///
    /// The only fallible path is the backend itself: a failure or timeout
    /// surfaces as `AppError::GenerationUnavailable` and must not be cached.
    pub async fn synthesize(&self, query: &Query, routed: &Routed) -> AppResult<Answer> {
        let start = Instant::now();

        let included = self.select_evidence(&routed.evidence);
        let system = self.system_prompt(routed.decision.route);
        let user = self.user_prompt(query.text(), &included);

        let request = GenerationRequest::new(user, &self.options.model)
            .with_system(system)
            .with_temperature(self.options.temperature)
            .with_max_tokens(self.options.max_tokens);

        let response = timeout(self.options.timeout, self.client.generate(&request))
            .await
            .map_err(|_| {
                AppError::GenerationUnavailable(format!(
                    "generation timed out after {}s",
                    self.options.timeout.as_secs()
                ))
            })??;

        let citations: Vec<Citation> = included.iter().map(Citation::from_evidence).collect();

        tracing::info!(
            route = routed.decision.route.as_str(),
            citations = citations.len(),
            "answer synthesized"
        );

        Ok(Answer {
            text: response.content,
            citations,
            decision: routed.decision.clone(),
            latency_ms: start.elapsed().as_millis() as u64,
            backend: format!("{}/{}", self.client.provider_name(), response.model),
        })
    }

    /// Apply the prompt budgets: each snippet is truncated to the per-item
    /// budget, then items are included in rank order until the total budget
    /// is spent. Dropped items are dropped entirely — they get no citation.
    /// The top-ranked item is always included, so a routed turn always keeps
    /// at least one citation.
    fn select_evidence(&self, evidence: &[EvidenceItem]) -> Vec<EvidenceItem> {
        let mut included = Vec::new();
        let mut spent = 0usize;

        for item in evidence {
            let snippet = truncate_snippet(&item.snippet, self.options.item_budget);
            let cost = snippet.chars().count();
            if !included.is_empty() && spent + cost > self.options.context_budget {
                tracing::debug!(
                    "Evidence budget exhausted; dropping {} lowest-ranked items",
                    evidence.len() - included.len()
                );
                break;
            }
            spent += cost;
            included.push(EvidenceItem {
                snippet,
                ..item.clone()
            });
        }

        included
    }

    /// Fixed instruction header per route.
    fn system_prompt(&self, route: Route) -> String {
        match route {
            Route::LocalRag | Route::WebFallback => String::from(
                "You are a careful assistant answering from the sources provided.\n\n\
                 Instructions:\n\
                 - Answer using ONLY the provided sources\n\
                 - If the sources do not contain the answer, say: \"I don't have enough information.\"\n\
                 - Do not mention retrieval machinery such as \"chunks\", \"snippets\", or \"Source 1\"\n\
                 - Keep your response concise and factual\n",
            ),
            // The model must not imply grounding it does not have
            Route::ModelOnly => String::from(
                "You are a careful assistant. No private documents or web results \
                 were consulted for this question; answer from your own general \
                 knowledge.\n\n\
                 Instructions:\n\
                 - Answer to the best of your knowledge\n\
                 - If unknown, say: \"I don't have enough information.\"\n\
                 - Do not claim to have read any document or web page\n\
                 - Keep your response concise and factual\n",
            ),
        }
    }

    /// Prompt body: source-labeled evidence (omitted entirely for model-only
    /// turns) followed by the question.
    fn user_prompt(&self, query: &str, included: &[EvidenceItem]) -> String {
        if included.is_empty() {
            return format!("Question:\n{}", query);
        }

        let sources: Vec<String> = included
            .iter()
            .enumerate()
            .map(|(i, item)| format!("[{}] {}\n{}", i + 1, item.origin.label(), item.snippet))
            .collect();

        format!(
            "Sources:\n{}\n\nQuestion:\n{}",
            sources.join("\n\n---\n\n"),
            query
        )
    }
}
