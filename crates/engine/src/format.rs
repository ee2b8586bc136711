//! Presentation formatting.
//!
//! Detects a requested presentation from the query phrasing and re-shapes the
//! final answer text. Pure string transformation applied by the host after a
//! turn; never affects routing or citations.

use serde::{Deserialize, Serialize};

/// How the answer text should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseFormat {
    Default,
    Bullets,
    Table,
    Summary,
    Detailed,
    Comparison,
}

impl ResponseFormat {
    /// Detect a format request from the query text.
    pub fn detect(prompt: &str) -> Self {
        let lower = prompt.to_lowercase();

        if ["bullet", "points", "list"].iter().any(|w| lower.contains(w)) {
            return Self::Bullets;
        }
        if ["table", "columns", "rows"].iter().any(|w| lower.contains(w)) {
            return Self::Table;
        }
        if lower.contains("summary") {
            return Self::Summary;
        }
        if ["detailed", "explain"].iter().any(|w| lower.contains(w)) {
            return Self::Detailed;
        }
        if ["compare", "versus"].iter().any(|w| lower.contains(w)) {
            return Self::Comparison;
        }

        Self::Default
    }

    /// Re-shape answer text for this format.
    pub fn apply(&self, content: &str) -> String {
        match self {
            Self::Bullets => to_bullets(content),
            Self::Table => to_table(content),
            Self::Summary => to_summary(content),
            Self::Detailed => format!("**Detailed Explanation**:\n{}", content),
            Self::Comparison => format!("**Comparison**:\n{}", content),
            Self::Default => content.to_string(),
        }
    }
}

fn sentences(content: &str) -> Vec<&str> {
    content
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn to_bullets(content: &str) -> String {
    let sentences = sentences(content);
    if sentences.len() <= 1 {
        return content.to_string();
    }

    sentences
        .iter()
        .take(5)
        .map(|s| format!("- {}", s))
        .collect::<Vec<_>>()
        .join("\n")
}

fn to_table(content: &str) -> String {
    let mut table = String::from("| Aspect | Details |\n|--------|---------|\n");
    for line in content.lines().filter(|l| !l.trim().is_empty()).take(5) {
        table.push_str(&format!("| Point | {} |\n", line.trim()));
    }
    table
}

fn to_summary(content: &str) -> String {
    let sentences = sentences(content);
    if sentences.len() <= 2 {
        return content.to_string();
    }
    format!("**Summary**: {}...", sentences[0])
}
