//! Ask command handler.
//!
//! Runs a single question through the engine and prints the cited answer.

use crate::wiring::build_engine;
use askroute_core::{config::AppConfig, AppResult};
use askroute_engine::{Query, ResponseFormat, TurnOutcome};
use clap::Args;
use std::path::PathBuf;

/// Ask a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub prompt: Option<String>,

    /// Read the question from a file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let text = self
            .get_prompt()
            .ok_or_else(|| askroute_core::AppError::Config("No question provided".to_string()))?;

        let engine = build_engine(config)?;
        let query = Query::new(text)?;
        let outcome = engine.handle(&query).await?;

        if self.json {
            print_json(&query, &outcome)?;
        } else {
            print_plain(&query, &outcome);
        }

        Ok(())
    }

    /// Get the question text from arguments or file.
    fn get_prompt(&self) -> Option<String> {
        self.prompt.clone().or_else(|| {
            self.file.as_ref().and_then(|path| {
                std::fs::read_to_string(path)
                    .map_err(|e| tracing::error!("Failed to read question file: {}", e))
                    .ok()
            })
        })
    }
}

/// Print the answer and citation footer as plain text.
pub(crate) fn print_plain(query: &Query, outcome: &TurnOutcome) {
    let format = ResponseFormat::detect(query.text());
    println!("{}", format.apply(&outcome.answer.text));

    if !outcome.answer.citations.is_empty() {
        println!();
        println!("Sources:");
        for citation in &outcome.answer.citations {
            println!("- {}", citation.reference);
        }
    }
}

/// Print the full turn as structured JSON.
fn print_json(query: &Query, outcome: &TurnOutcome) -> AppResult<()> {
    let output = serde_json::json!({
        "query": query.text(),
        "answer": outcome.answer.text,
        "route": outcome.answer.decision.route,
        "reason": outcome.answer.decision.reason,
        "citations": outcome.answer.citations,
        "backend": outcome.answer.backend,
        "cacheHit": outcome.cache_hit,
        "latencyMs": outcome.latency_ms,
    });

    let json = serde_json::to_string_pretty(&output)?;
    println!("{}", json);
    Ok(())
}
