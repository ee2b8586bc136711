//! The askroute decision core.
//!
//! Given a query, decide which knowledge source is trustworthy enough to
//! answer from — the private document store, live web search, or the bare
//! model — synthesize an answer grounded in the chosen evidence, and bind a
//! citation to everything actually used. The pieces:
//!
//! - [`gate::RelevanceGate`] — pure threshold check on local evidence
//! - [`router::Router`] — explicit state machine over the source fallback chain
//! - [`synthesizer::Synthesizer`] — prompt assembly, one backend call, citations
//! - [`cache::ResponseCache`] — normalized-key memoization of whole answers
//! - [`recorder`] — per-turn audit records and sinks
//! - [`engine::Engine`] — a whole turn, wired together

pub mod cache;
pub mod engine;
pub mod format;
pub mod gate;
pub mod recorder;
pub mod router;
pub mod session;
pub mod synthesizer;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use cache::ResponseCache;
pub use engine::Engine;
pub use format::ResponseFormat;
pub use gate::RelevanceGate;
pub use recorder::{InteractionSink, TracingSink, TurnRecord};
pub use router::{Routed, Router, RouterOptions};
pub use session::{Exchange, Session};
pub use synthesizer::{Synthesizer, SynthesizerOptions};
pub use types::{Answer, Citation, Query, Route, RouteDecision, TurnOutcome};
