//! Engine construction from application configuration.

use askroute_core::{AppConfig, AppError, AppResult};
use askroute_engine::{
    Engine, RelevanceGate, ResponseCache, Router, RouterOptions, Synthesizer, SynthesizerOptions,
    TracingSink,
};
use askroute_llm::create_client;
use askroute_retrieval::{ChromaStore, EvidenceItem, QueryExpander, TavilySearch, WebSearch};
use std::sync::Arc;
use std::time::Duration;

use crate::sink::JsonlSink;

/// Web search stand-in used when no API key is configured.
///
/// Fails like a real provider outage, so the router degrades the route and
/// records the reason instead of the CLI refusing to start.
struct WebSearchDisabled;

#[async_trait::async_trait]
impl WebSearch for WebSearchDisabled {
    async fn search(&self, _query: &str) -> AppResult<Vec<EvidenceItem>> {
        Err(AppError::WebSearch(
            "no web search API key configured".to_string(),
        ))
    }
}

/// Build a ready engine from configuration.
pub fn build_engine(config: &AppConfig) -> AppResult<Engine> {
    let store = Arc::new(ChromaStore::new(
        &config.retrieval.endpoint,
        &config.retrieval.collection,
    ));

    let web: Arc<dyn WebSearch> = match config.resolve_web_api_key() {
        Some(key) => Arc::new(TavilySearch::new(
            &config.web.endpoint,
            key,
            config.web.max_results,
        )),
        None => {
            tracing::warn!(
                "{} not set; web fallback disabled for this session",
                config.web.api_key_env
            );
            Arc::new(WebSearchDisabled)
        }
    };

    let client = create_client(
        &config.provider,
        config.endpoint.as_deref(),
        config.api_key.as_deref(),
    )?;

    let router = Router::new(
        store,
        web,
        RelevanceGate::new(config.retrieval.relevance_threshold),
        QueryExpander::new(config.retrieval.expansions.clone()),
        RouterOptions {
            top_k: config.retrieval.top_k,
            timeout: Duration::from_secs(config.retrieval.timeout_secs),
        },
    );

    let synthesizer = Synthesizer::new(
        client,
        SynthesizerOptions {
            model: config.model.clone(),
            temperature: config.synthesis.temperature,
            max_tokens: config.synthesis.max_tokens,
            item_budget: config.synthesis.item_budget,
            context_budget: config.synthesis.context_budget,
            timeout: Duration::from_secs(config.synthesis.timeout_secs),
        },
    );

    let cache = match config.cache.ttl_secs {
        Some(secs) => ResponseCache::with_ttl(Duration::from_secs(secs)),
        None => ResponseCache::new(),
    };

    let mut engine = Engine::new(router, synthesizer, cache).with_sink(Arc::new(TracingSink));

    if let Some(ref path) = config.log_file {
        engine = engine.with_sink(Arc::new(JsonlSink::new(path.clone())));
    }

    Ok(engine)
}
