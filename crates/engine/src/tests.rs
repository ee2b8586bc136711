//! Engine-level scenario tests with mock adapters.
//!
//! Mocks live here so module tests can share them.

use crate::cache::ResponseCache;
use crate::engine::Engine;
use crate::gate::RelevanceGate;
use crate::router::{Router, RouterOptions};
use crate::synthesizer::{Synthesizer, SynthesizerOptions};
use crate::types::{Query, Route};
use askroute_core::{AppError, AppResult};
use askroute_llm::{GenerationClient, GenerationRequest, GenerationResponse, GenerationUsage};
use askroute_retrieval::{
    EvidenceItem, EvidenceOrigin, EvidenceStore, QueryExpander, WebSearch,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Store that returns a fixed batch.
pub(crate) struct FixedStore(pub Vec<EvidenceItem>);

#[async_trait::async_trait]
impl EvidenceStore for FixedStore {
    async fn search(&self, _query: &str, _k: usize) -> AppResult<Vec<EvidenceItem>> {
        Ok(self.0.clone())
    }
}

/// Store that answers each query text with its own batch.
pub(crate) struct MappedStore(pub std::collections::HashMap<String, Vec<EvidenceItem>>);

#[async_trait::async_trait]
impl EvidenceStore for MappedStore {
    async fn search(&self, query: &str, _k: usize) -> AppResult<Vec<EvidenceItem>> {
        Ok(self.0.get(query).cloned().unwrap_or_default())
    }
}

/// Store that always fails.
pub(crate) struct FailingStore;

#[async_trait::async_trait]
impl EvidenceStore for FailingStore {
    async fn search(&self, _query: &str, _k: usize) -> AppResult<Vec<EvidenceItem>> {
        Err(AppError::Retrieval("index unreachable".to_string()))
    }
}

/// Store that sleeps past any reasonable timeout.
pub(crate) struct SlowStore(pub Duration);

#[async_trait::async_trait]
impl EvidenceStore for SlowStore {
    async fn search(&self, _query: &str, _k: usize) -> AppResult<Vec<EvidenceItem>> {
        tokio::time::sleep(self.0).await;
        Ok(Vec::new())
    }
}

/// Web search that returns a fixed batch.
pub(crate) struct FixedWeb(pub Vec<EvidenceItem>);

#[async_trait::async_trait]
impl WebSearch for FixedWeb {
    async fn search(&self, _query: &str) -> AppResult<Vec<EvidenceItem>> {
        Ok(self.0.clone())
    }
}

/// Web search that always fails.
pub(crate) struct FailingWeb;

#[async_trait::async_trait]
impl WebSearch for FailingWeb {
    async fn search(&self, _query: &str) -> AppResult<Vec<EvidenceItem>> {
        Err(AppError::WebSearch("quota exhausted".to_string()))
    }
}

/// Backend that deterministically echoes the prompt and counts calls.
#[derive(Default)]
pub(crate) struct EchoClient {
    pub calls: AtomicUsize,
}

#[async_trait::async_trait]
impl GenerationClient for EchoClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerationRequest) -> AppResult<GenerationResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(GenerationResponse {
            content: format!("echo:{}", request.prompt),
            model: request.model.clone(),
            usage: GenerationUsage::new(10, 10),
        })
    }
}

/// Backend that is down.
pub(crate) struct FailingClient;

#[async_trait::async_trait]
impl GenerationClient for FailingClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, _request: &GenerationRequest) -> AppResult<GenerationResponse> {
        Err(AppError::GenerationUnavailable(
            "connection refused".to_string(),
        ))
    }
}

pub(crate) fn local_item(rank: usize, score: f32) -> EvidenceItem {
    EvidenceItem {
        origin: EvidenceOrigin::Document {
            name: format!("doc{}.md", rank),
            chunk: rank,
        },
        snippet: format!("local snippet {}", rank),
        score,
        rank,
    }
}

pub(crate) fn web_item(rank: usize) -> EvidenceItem {
    EvidenceItem {
        origin: EvidenceOrigin::Web {
            url: format!("https://example.com/{}", rank),
        },
        snippet: format!("web snippet {}", rank),
        score: 0.8,
        rank,
    }
}

fn build_engine(
    store: Arc<dyn EvidenceStore>,
    web: Arc<dyn WebSearch>,
    client: Arc<dyn GenerationClient>,
) -> Engine {
    build_engine_with_timeout(store, web, client, Duration::from_secs(5))
}

fn build_engine_with_timeout(
    store: Arc<dyn EvidenceStore>,
    web: Arc<dyn WebSearch>,
    client: Arc<dyn GenerationClient>,
    timeout: Duration,
) -> Engine {
    let router = Router::new(
        store,
        web,
        RelevanceGate::new(0.75),
        QueryExpander::default(),
        RouterOptions { top_k: 4, timeout },
    );
    let synthesizer = Synthesizer::new(
        client,
        SynthesizerOptions {
            model: "test-model".to_string(),
            ..SynthesizerOptions::default()
        },
    );
    Engine::new(router, synthesizer, ResponseCache::new())
}

#[tokio::test]
async fn scenario_a_strong_local_evidence_routes_local() {
    let engine = build_engine(
        Arc::new(FixedStore(vec![local_item(0, 0.9)])),
        Arc::new(FixedWeb(vec![web_item(0)])),
        Arc::new(EchoClient::default()),
    );

    let query = Query::new("What is in the handbook?").unwrap();
    let outcome = engine.handle(&query).await.unwrap();

    assert_eq!(outcome.answer.decision.route, Route::LocalRag);
    assert_eq!(outcome.answer.citations.len(), 1);
    assert_eq!(outcome.answer.citations[0].reference, "doc0.md");
    assert!(!outcome.cache_hit);
}

#[tokio::test]
async fn scenario_b_weak_local_evidence_falls_back_to_web() {
    let engine = build_engine(
        Arc::new(FixedStore(vec![local_item(0, 0.3), local_item(1, 0.2)])),
        Arc::new(FixedWeb(vec![web_item(0), web_item(1)])),
        Arc::new(EchoClient::default()),
    );

    let query = Query::new("Something not in the documents").unwrap();
    let outcome = engine.handle(&query).await.unwrap();

    assert_eq!(outcome.answer.decision.route, Route::WebFallback);
    assert_eq!(outcome.answer.citations.len(), 2);
    assert!(outcome.answer.citations[0].reference.starts_with("https://"));
    assert!(outcome
        .answer
        .decision
        .reason
        .contains("below threshold"));
}

#[tokio::test]
async fn scenario_c_no_evidence_anywhere_routes_model_only() {
    let engine = build_engine(
        Arc::new(FixedStore(Vec::new())),
        Arc::new(FixedWeb(Vec::new())),
        Arc::new(EchoClient::default()),
    );

    let query = Query::new("Pure trivia question").unwrap();
    let outcome = engine.handle(&query).await.unwrap();

    assert_eq!(outcome.answer.decision.route, Route::ModelOnly);
    assert!(outcome.answer.citations.is_empty());
    // EchoClient reflects the prompt: no evidence section was built
    assert!(!outcome.answer.text.contains("Sources:"));
    assert!(outcome.answer.text.contains("Pure trivia question"));
}

#[tokio::test]
async fn scenario_d_store_timeout_degrades_to_web() {
    let engine = build_engine_with_timeout(
        Arc::new(SlowStore(Duration::from_millis(500))),
        Arc::new(FixedWeb(vec![web_item(0)])),
        Arc::new(EchoClient::default()),
        Duration::from_millis(50),
    );

    let query = Query::new("Anything").unwrap();
    let outcome = engine.handle(&query).await.unwrap();

    assert_eq!(outcome.answer.decision.route, Route::WebFallback);
    assert_eq!(outcome.answer.citations.len(), 1);
    assert!(outcome.answer.decision.reason.contains("timed out"));
}

#[tokio::test]
async fn scenario_d_store_failure_degrades_to_web() {
    let engine = build_engine(
        Arc::new(FailingStore),
        Arc::new(FixedWeb(vec![web_item(0)])),
        Arc::new(EchoClient::default()),
    );

    let query = Query::new("Anything").unwrap();
    let outcome = engine.handle(&query).await.unwrap();

    assert_eq!(outcome.answer.decision.route, Route::WebFallback);
    assert!(outcome
        .answer
        .decision
        .reason
        .contains("local retrieval unavailable"));
}

#[tokio::test]
async fn scenario_e_generation_failure_surfaces_and_caches_nothing() {
    let engine = build_engine(
        Arc::new(FixedStore(vec![local_item(0, 0.9)])),
        Arc::new(FixedWeb(Vec::new())),
        Arc::new(FailingClient),
    );

    let query = Query::new("Doomed question").unwrap();
    let result = engine.handle(&query).await;

    assert!(matches!(result, Err(AppError::GenerationUnavailable(_))));
    assert!(engine.cache().is_empty());
}

#[tokio::test]
async fn both_adapters_failing_still_yields_model_only_answer() {
    let engine = build_engine(
        Arc::new(FailingStore),
        Arc::new(FailingWeb),
        Arc::new(EchoClient::default()),
    );

    let query = Query::new("Degrade all the way").unwrap();
    let outcome = engine.handle(&query).await.unwrap();

    assert_eq!(outcome.answer.decision.route, Route::ModelOnly);
    assert!(outcome.answer.citations.is_empty());
    assert!(outcome
        .answer
        .decision
        .reason
        .contains("local retrieval unavailable"));
    assert!(outcome
        .answer
        .decision
        .reason
        .contains("web search unavailable"));
}

#[tokio::test]
async fn repeated_query_is_a_byte_identical_cache_hit() {
    let client = Arc::new(EchoClient::default());
    let engine = build_engine(
        Arc::new(FixedStore(vec![local_item(0, 0.9)])),
        Arc::new(FixedWeb(Vec::new())),
        client.clone(),
    );

    let query = Query::new("What is RAG?").unwrap();
    let first = engine.handle(&query).await.unwrap();
    let second = engine.handle(&query).await.unwrap();

    assert!(!first.cache_hit);
    assert!(second.cache_hit);
    assert_eq!(first.answer, second.answer);
    // The backend was consulted exactly once across both turns
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn normalized_query_variants_hit_the_same_entry() {
    let client = Arc::new(EchoClient::default());
    let engine = build_engine(
        Arc::new(FixedStore(vec![local_item(0, 0.9)])),
        Arc::new(FixedWeb(Vec::new())),
        client.clone(),
    );

    engine.handle(&Query::new("What is RAG?").unwrap()).await.unwrap();
    let hit1 = engine.handle(&Query::new(" what is rag? ").unwrap()).await.unwrap();
    let hit2 = engine.handle(&Query::new("What  is  RAG?").unwrap()).await.unwrap();

    assert!(hit1.cache_hit);
    assert!(hit2.cache_hit);
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn model_only_iff_citations_empty() {
    // LocalRag and WebFallback turns carry citations; ModelOnly never does.
    let cases: Vec<(Arc<dyn EvidenceStore>, Arc<dyn WebSearch>)> = vec![
        (
            Arc::new(FixedStore(vec![local_item(0, 0.9)])),
            Arc::new(FixedWeb(Vec::new())),
        ),
        (
            Arc::new(FixedStore(Vec::new())),
            Arc::new(FixedWeb(vec![web_item(0)])),
        ),
        (Arc::new(FixedStore(Vec::new())), Arc::new(FixedWeb(Vec::new()))),
    ];

    for (store, web) in cases {
        let engine = build_engine(store, web, Arc::new(EchoClient::default()));
        let outcome = engine.handle(&Query::new("q").unwrap()).await.unwrap();
        assert_eq!(
            outcome.answer.decision.route == Route::ModelOnly,
            outcome.answer.citations.is_empty()
        );
    }
}

#[tokio::test]
async fn expanded_queries_merge_and_dedup_by_origin() {
    let shared = local_item(0, 0.9);
    let extra = local_item(1, 0.8);

    let mut batches = std::collections::HashMap::new();
    batches.insert("find alpha".to_string(), vec![shared.clone()]);
    batches.insert(
        "beta query".to_string(),
        vec![shared.clone(), extra.clone()],
    );

    let mut table = std::collections::HashMap::new();
    table.insert("alpha".to_string(), vec!["beta query".to_string()]);

    let router = Router::new(
        Arc::new(MappedStore(batches)),
        Arc::new(FixedWeb(Vec::new())),
        RelevanceGate::new(0.75),
        QueryExpander::new(table),
        RouterOptions::default(),
    );

    let routed = router.route("find alpha").await;

    assert_eq!(routed.decision.route, Route::LocalRag);
    // The shared chunk appears once, first-seen order preserved, ranks
    // reassigned over the merged batch
    assert_eq!(routed.evidence.len(), 2);
    assert_eq!(routed.evidence[0].origin, shared.origin);
    assert_eq!(routed.evidence[1].origin, extra.origin);
    assert_eq!(routed.evidence[0].rank, 0);
    assert_eq!(routed.evidence[1].rank, 1);
}

#[tokio::test]
async fn tied_top_scores_preserve_store_order() {
    let mut first = local_item(0, 0.9);
    first.origin = EvidenceOrigin::Document {
        name: "first.md".to_string(),
        chunk: 0,
    };
    let mut second = local_item(1, 0.9);
    second.origin = EvidenceOrigin::Document {
        name: "second.md".to_string(),
        chunk: 0,
    };

    let engine = build_engine(
        Arc::new(FixedStore(vec![first, second])),
        Arc::new(FixedWeb(Vec::new())),
        Arc::new(EchoClient::default()),
    );

    let outcome = engine.handle(&Query::new("tie").unwrap()).await.unwrap();

    assert_eq!(outcome.answer.decision.route, Route::LocalRag);
    // First-returned wins as primary; the tied peer stays as support
    assert_eq!(outcome.answer.citations[0].reference, "first.md");
    assert_eq!(outcome.answer.citations[1].reference, "second.md");
}
