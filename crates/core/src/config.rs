//! Configuration management for the askroute assistant.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Environment variables
//! - Command-line flags
//! - Config files (.askroute/config.yaml)
//!
//! Routing policy knobs (relevance threshold, top-k, budgets) live here as
//! tunable parameters rather than hardcoded constants.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
///
/// Holds all global options that affect assistant behavior across commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .askroute/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Generation backend provider (e.g., "ollama")
    pub provider: String,

    /// Default model identifier
    pub model: String,

    /// Custom endpoint for the generation backend
    pub endpoint: Option<String>,

    /// API key for the generation backend
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Evidence store and routing settings
    pub retrieval: RetrievalConfig,

    /// Web search fallback settings
    pub web: WebSearchConfig,

    /// Answer synthesis settings
    pub synthesis: SynthesisConfig,

    /// Response cache settings
    pub cache: CacheConfig,

    /// Path for the JSONL interaction log (None disables file logging)
    pub log_file: Option<PathBuf>,
}

/// Evidence store and routing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Base URL of the vector store HTTP service
    pub endpoint: String,

    /// Collection to query
    pub collection: String,

    /// Number of chunks retrieved per query
    #[serde(rename = "topK")]
    pub top_k: usize,

    /// Minimum relevance score for local evidence to be trusted (τ)
    #[serde(rename = "relevanceThreshold")]
    pub relevance_threshold: f32,

    /// Per-call timeout in seconds
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: u64,

    /// Query expansion table: phrase -> synonymous phrasings
    #[serde(default)]
    pub expansions: HashMap<String, Vec<String>>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000".to_string(),
            collection: "documents".to_string(),
            top_k: 4,
            relevance_threshold: 0.75,
            timeout_secs: 10,
            expansions: HashMap::new(),
        }
    }
}

/// Web search fallback configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchConfig {
    /// Search API endpoint
    pub endpoint: String,

    /// Environment variable holding the API key
    #[serde(rename = "apiKeyEnv")]
    pub api_key_env: String,

    /// Maximum results per search
    #[serde(rename = "maxResults")]
    pub max_results: usize,

    /// Per-call timeout in seconds
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: u64,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.tavily.com/search".to_string(),
            api_key_env: "TAVILY_API_KEY".to_string(),
            max_results: 3,
            timeout_secs: 15,
        }
    }
}

/// Answer synthesis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Sampling temperature for factual answering
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(rename = "maxTokens")]
    pub max_tokens: u32,

    /// Hard per-item character budget for evidence snippets in the prompt
    #[serde(rename = "itemBudget")]
    pub item_budget: usize,

    /// Total character budget for the evidence section; lowest-ranked items
    /// past this budget are dropped entirely
    #[serde(rename = "contextBudget")]
    pub context_budget: usize,

    /// Generation timeout in seconds
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 1000,
            item_budget: 800,
            context_budget: 4000,
            timeout_secs: 60,
        }
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry time-to-live in seconds; None means entries never expire
    #[serde(rename = "ttlSecs")]
    pub ttl_secs: Option<u64>,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    retrieval: Option<RetrievalConfig>,
    web: Option<WebSearchConfig>,
    synthesis: Option<SynthesisConfig>,
    cache: Option<CacheConfig>,
    logging: Option<LoggingSection>,
    #[serde(rename = "logFile")]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            endpoint: None,
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            retrieval: RetrievalConfig::default(),
            web: WebSearchConfig::default(),
            synthesis: SynthesisConfig::default(),
            cache: CacheConfig::default(),
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `ASKROUTE_WORKSPACE`: Override workspace path
    /// - `ASKROUTE_CONFIG`: Path to config file
    /// - `ASKROUTE_PROVIDER`: Generation backend provider
    /// - `ASKROUTE_MODEL`: Model identifier
    /// - `ASKROUTE_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("ASKROUTE_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("ASKROUTE_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        // Load from YAML config file if it exists
        let config_path = if let Some(ref cf) = config.config_file {
            cf.clone()
        } else {
            config.workspace.join(".askroute/config.yaml")
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("ASKROUTE_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("ASKROUTE_MODEL") {
            config.model = model;
        }

        if let Ok(key) = std::env::var("ASKROUTE_API_KEY") {
            config.api_key = Some(key);
        }
        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if llm.endpoint.is_some() {
                result.endpoint = llm.endpoint;
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        if let Some(web) = config_file.web {
            result.web = web;
        }

        if let Some(synthesis) = config_file.synthesis {
            result.synthesis = synthesis;
        }

        if let Some(cache) = config_file.cache {
            result.cache = cache;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if config_file.log_file.is_some() {
            result.log_file = config_file.log_file;
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Merges command-line flags with the loaded configuration, giving
    /// precedence to CLI flags over environment variables.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .askroute directory.
    pub fn askroute_dir(&self) -> PathBuf {
        self.workspace.join(".askroute")
    }

    /// Ensure the .askroute directory exists.
    pub fn ensure_askroute_dir(&self) -> AppResult<()> {
        let dir = self.askroute_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .askroute directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Resolve the web search API key from the configured environment variable.
    pub fn resolve_web_api_key(&self) -> Option<String> {
        std::env::var(&self.web.api_key_env).ok()
    }

    /// Validate configuration before building the engine.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["ollama", "openai", "claude"];

        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        if self.retrieval.top_k == 0 {
            return Err(AppError::Config(
                "retrieval.topK must be at least 1".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.retrieval.relevance_threshold) {
            return Err(AppError::Config(format!(
                "retrieval.relevanceThreshold must be within [0.0, 1.0], got {}",
                self.retrieval.relevance_threshold
            )));
        }

        if self.synthesis.item_budget == 0 || self.synthesis.context_budget == 0 {
            return Err(AppError::Config(
                "synthesis budgets must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.retrieval.relevance_threshold, 0.75);
        assert!(config.cache.ttl_secs.is_none());
        assert!(!config.verbose);
    }

    #[test]
    fn test_askroute_dir() {
        let config = AppConfig::default();
        assert!(config.askroute_dir().ends_with(".askroute"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            None,
            Some("openai".to_string()),
            Some("gpt-4".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "openai");
        assert_eq!(overridden.model, "gpt-4");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_threshold_range() {
        let mut config = AppConfig::default();
        config.retrieval.relevance_threshold = 1.5;
        assert!(config.validate().is_err());

        config.retrieval.relevance_threshold = 0.75;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_top_k() {
        let mut config = AppConfig::default();
        config.retrieval.top_k = 0;
        assert!(config.validate().is_err());
    }
}
