//! Configuration management for Steward
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/steward/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{Result, StewardError};

/// Main configuration for Steward
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// LLM provider configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Web search configuration
    #[serde(default)]
    pub search: SearchConfig,
    /// Page fetch configuration
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Market data configuration
    #[serde(default)]
    pub market: MarketConfig,
    /// Agent configuration
    #[serde(default)]
    pub agent: AgentConfig,
}

/// OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL, without the `/chat/completions` suffix
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Never written to disk; read from the environment
    #[serde(skip)]
    pub api_key: String,
}

/// Search provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// DuckDuckGo HTML endpoint base
    pub base_url: String,
    /// Region code (`wt-wt` is "no region")
    pub region: String,
    /// Whether safe search is on
    pub safe_search: bool,
    /// Recency window: d, w, m or y
    pub time_limit: String,
    /// Default number of results handed to the model
    pub max_results: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Page fetcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User agent sent with page requests
    pub user_agent: String,
}

/// Market data provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Yahoo Finance API base
    pub base_url: String,
    /// URL that hands out the session cookie needed for a crumb
    pub cookie_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Agent behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum tool-call rounds per user turn
    /// Default: 8
    pub max_tool_rounds: usize,
    /// Whether to show debug output
    pub debug: bool,
    /// Replaces the built-in system prompt when set
    pub system_prompt: Option<String>,
}

fn env_flag(key: &str) -> Option<bool> {
    env::var(key).ok().map(|v| v == "true" || v == "1")
}

/// Read the provider key from the environment
pub fn api_key_from_env() -> String {
    env::var("STEWARD_API_KEY")
        .or_else(|_| env::var("GROQ_API_KEY"))
        .unwrap_or_default()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("STEWARD_LLM_URL")
                .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string()),
            model: env::var("STEWARD_MODEL").unwrap_or_else(|_| "llama3-70b-8192".to_string()),
            temperature: 0.1,
            timeout_secs: 120,
            api_key: api_key_from_env(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://html.duckduckgo.com".to_string(),
            region: "wt-wt".to_string(),
            safe_search: false,
            time_limit: "y".to_string(),
            max_results: 5,
            timeout_secs: 15,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            user_agent: concat!("steward/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query2.finance.yahoo.com".to_string(),
            cookie_url: "https://fc.yahoo.com".to_string(),
            timeout_secs: 15,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: env::var("STEWARD_MAX_ROUNDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8),
            debug: env_flag("STEWARD_DEBUG").unwrap_or(false),
            system_prompt: None,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("steward")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();

        let mut config = match Self::load_from_file() {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("using default config: {}", e);
                Self::default()
            }
        };

        config.llm.api_key = api_key_from_env();
        config
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(StewardError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| StewardError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| StewardError::config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<PathBuf> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| StewardError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| StewardError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| StewardError::config(format!("Failed to write config: {}", e)))?;

        Ok(config_path)
    }

    /// The provider key, or an error telling the user how to set it
    pub fn api_key(&self) -> Result<&str> {
        let key = self.llm.api_key.trim();
        if key.is_empty() {
            Err(StewardError::MissingApiKey)
        } else {
            Ok(key)
        }
    }
}
