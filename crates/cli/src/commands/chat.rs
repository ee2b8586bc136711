//! Chat command handler.
//!
//! Turn-based interactive session: one query runs to completion before the
//! next is read. Type "quit" to exit.

use crate::commands::ask::print_plain;
use crate::wiring::build_engine;
use askroute_core::{config::AppConfig, AppError, AppResult};
use askroute_engine::{Query, Session};
use clap::Args;
use std::io::{BufRead, Write};

/// Interactive chat session
#[derive(Args, Debug)]
pub struct ChatCommand {}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Starting chat session");

        let engine = build_engine(config)?;
        let mut session = Session::new();

        let stdin = std::io::stdin();
        let mut lines = stdin.lock().lines();

        println!("askroute chat — ask a question, or 'quit' to exit");

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let line = match lines.next() {
                Some(line) => line?,
                None => break, // EOF
            };

            let trimmed = line.trim();
            if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
                break;
            }

            let query = match Query::new(trimmed) {
                Ok(query) => query,
                Err(AppError::InvalidQuery(_)) => continue,
                Err(e) => return Err(e),
            };

            match engine.handle(&query).await {
                Ok(outcome) => {
                    println!();
                    print_plain(&query, &outcome);
                    println!();
                    session.push(query, outcome.answer);
                }
                Err(AppError::GenerationUnavailable(reason)) => {
                    // The one failure with no lower fallback; report and keep
                    // the session alive.
                    eprintln!("Could not generate an answer: {}", reason);
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!("Chat session ended after {} exchanges", session.len());
        Ok(())
    }
}
