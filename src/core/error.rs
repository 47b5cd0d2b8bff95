//! Custom error types for Steward
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for Steward operations
#[derive(Error, Debug)]
pub enum StewardError {
    /// LLM provider connection or API errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Search provider errors or invalid queries
    #[error("Search error: {0}")]
    Search(String),

    /// Page fetch errors
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Field name outside the stock lookup vocabulary
    #[error("Unknown stock field '{0}'. Valid fields: {1}")]
    UnknownStockField(String, String),

    /// Ticker symbol the market-data provider does not know
    #[error("Symbol '{0}' not found")]
    SymbolNotFound(String),

    /// Field is valid but absent from the symbol's snapshot
    #[error("Field '{field}' not available for {symbol}")]
    StockFieldMissing { symbol: String, field: String },

    /// Market-data provider transport or protocol errors
    #[error("Market data error: {0}")]
    MarketData(String),

    /// Tool call the registry could not dispatch
    #[error("Invalid tool call: {0}")]
    InvalidToolCall(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// No API key in the environment
    #[error("No LLM API key found. Set GROQ_API_KEY (or STEWARD_API_KEY) in the environment or a .env file")]
    MissingApiKey,

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for Steward operations
pub type Result<T> = std::result::Result<T, StewardError>;

impl StewardError {
    /// Create an LLM error
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Create a search error
    pub fn search(msg: impl Into<String>) -> Self {
        Self::Search(msg.into())
    }

    /// Create a fetch error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a market data error
    pub fn market(msg: impl Into<String>) -> Self {
        Self::MarketData(msg.into())
    }

    /// Create an invalid tool call error
    pub fn invalid_call(msg: impl Into<String>) -> Self {
        Self::InvalidToolCall(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the error is a stock lookup failure the model can correct
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            Self::UnknownStockField(..) | Self::SymbolNotFound(_) | Self::StockFieldMissing { .. }
        )
    }
}
