//! JSONL interaction-log sink.
//!
//! Appends one JSON record per turn to a file. The record schema is
//! `askroute_engine::TurnRecord`; the line-per-record format keeps appends
//! atomic enough for a single-process host.

use askroute_core::{AppError, AppResult};
use askroute_engine::{InteractionSink, TurnRecord};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// File-backed interaction sink.
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a sink appending to the given path. Parent directories are
    /// created on first write.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl InteractionSink for JsonlSink {
    fn record(&self, record: &TurnRecord) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let line = serde_json::to_string(record)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                AppError::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to open interaction log {:?}: {}", self.path, e),
                ))
            })?;

        writeln!(file, "{}", line)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askroute_engine::{Query, Route, TurnOutcome};
    use askroute_engine::{Answer, RouteDecision};

    fn outcome() -> TurnOutcome {
        TurnOutcome {
            answer: Answer {
                text: "answer".to_string(),
                citations: Vec::new(),
                decision: RouteDecision::new(Route::ModelOnly, "no evidence".to_string()),
                latency_ms: 10,
                backend: "ollama/llama3.2".to_string(),
            },
            cache_hit: false,
            latency_ms: 12,
        }
    }

    #[test]
    fn test_appends_one_parseable_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/interactions.jsonl");
        let sink = JsonlSink::new(path.clone());

        let query = Query::new("What is RAG?").unwrap();
        let record = TurnRecord::from_turn(&query, &outcome());
        sink.record(&record).unwrap();
        sink.record(&record).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        for line in lines {
            let parsed: TurnRecord = serde_json::from_str(line).unwrap();
            assert_eq!(parsed.query, "What is RAG?");
            assert_eq!(parsed.route, Route::ModelOnly);
        }
    }
}
