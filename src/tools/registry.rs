//! Tool registry - describes and dispatches tool calls
//!
//! The tool set is closed: every tool is a [`ToolKind`] variant with a typed
//! argument struct, and dispatch is a match over [`ToolInvocation`].

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::{Config, Result, StewardError, ToolCall, ToolDefinition, ToolResult};
use crate::tools::fetch::PageFetcher;
use crate::tools::search::{SearchClient, MAX_RESULTS_CEILING};
use crate::tools::stock::{StockField, StockInfoClient};

/// The tools the agent can call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    SearchInternet,
    RequestUrl,
    StockInfo,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [
        ToolKind::SearchInternet,
        ToolKind::RequestUrl,
        ToolKind::StockInfo,
    ];

    /// Name the model calls the tool by
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::SearchInternet => "search_internet",
            ToolKind::RequestUrl => "request_url",
            ToolKind::StockInfo => "get_stock_info",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    /// Schema sent to the model
    pub fn definition(&self) -> ToolDefinition {
        let max_results_help =
            format!("Number of results (default 5, at most {})", MAX_RESULTS_CEILING);
        match self {
            ToolKind::SearchInternet => ToolDefinition::function(
                self.name(),
                "Fetches the top search engine results for any query. Returns an array of \
                 objects with title, snippet and url. Once the results are returned you MUST \
                 call request_url to read the details behind a promising url.",
                json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "What to look for, e.g. \"latest tax regulations for family offices in Dubai\""
                        },
                        "max_results": {
                            "type": "integer",
                            "description": max_results_help
                        }
                    },
                    "required": ["query"]
                }),
            ),
            ToolKind::RequestUrl => ToolDefinition::function(
                self.name(),
                "Sends a GET request to the url. Returns the JSON body if the page is JSON, \
                 otherwise the text of the page's headings and paragraphs, one per line.",
                json!({
                    "type": "object",
                    "properties": {
                        "url": {
                            "type": "string",
                            "description": "Absolute http(s) URL to read"
                        }
                    },
                    "required": ["url"]
                }),
            ),
            ToolKind::StockInfo => {
                let fields: Vec<&str> = StockField::ALL.iter().map(StockField::key).collect();
                ToolDefinition::function(
                    self.name(),
                    "Looks up one piece of current stock data for a ticker symbol. Choose the \
                     field that answers the question: previousClose for the last closing price, \
                     currentPrice for the live price, companyOfficers for management, \
                     longBusinessSummary for what the company does.",
                    json!({
                        "type": "object",
                        "properties": {
                            "symbol": {
                                "type": "string",
                                "description": "Ticker symbol, e.g. AAPL"
                            },
                            "field": {
                                "type": "string",
                                "enum": fields,
                                "description": "Field to return"
                            }
                        },
                        "required": ["symbol", "field"]
                    }),
                )
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchArgs {
    pub query: String,
    #[serde(default)]
    pub max_results: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FetchArgs {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StockArgs {
    pub symbol: String,
    pub field: String,
}

/// A tool call whose name and arguments have been checked
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    Search(SearchArgs),
    Fetch(FetchArgs),
    StockInfo { symbol: String, field: StockField },
}

impl ToolInvocation {
    /// Validate a raw call from the model
    pub fn parse(call: &ToolCall) -> Result<Self> {
        let kind = ToolKind::from_name(&call.name)
            .ok_or_else(|| StewardError::invalid_call(format!("unknown tool '{}'", call.name)))?;

        match kind {
            ToolKind::SearchInternet => Ok(Self::Search(parse_args(call)?)),
            ToolKind::RequestUrl => Ok(Self::Fetch(parse_args(call)?)),
            ToolKind::StockInfo => {
                let args: StockArgs = parse_args(call)?;
                Ok(Self::StockInfo {
                    symbol: args.symbol,
                    field: args.field.parse()?,
                })
            }
        }
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            Self::Search(_) => ToolKind::SearchInternet,
            Self::Fetch(_) => ToolKind::RequestUrl,
            Self::StockInfo { .. } => ToolKind::StockInfo,
        }
    }
}

fn parse_args<T: DeserializeOwned>(call: &ToolCall) -> Result<T> {
    // Some models double-encode the arguments object as a JSON string
    let arguments = match &call.arguments {
        Value::String(raw) => serde_json::from_str(raw).map_err(|_| {
            StewardError::invalid_call(format!(
                "arguments for '{}' are not a JSON object: {}",
                call.name, raw
            ))
        })?,
        other => other.clone(),
    };

    serde_json::from_value(arguments).map_err(|e| {
        StewardError::invalid_call(format!("bad arguments for '{}': {}", call.name, e))
    })
}

/// Registry of available tools
pub struct ToolRegistry {
    search: SearchClient,
    fetcher: PageFetcher,
    stocks: StockInfoClient,
}

impl ToolRegistry {
    /// Build every client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            search: SearchClient::new(&config.search)?,
            fetcher: PageFetcher::new(&config.fetch)?,
            stocks: StockInfoClient::new(&config.market)?,
        })
    }

    /// Schemas for every tool, in a stable order
    pub fn describe_all(&self) -> Vec<ToolDefinition> {
        ToolKind::ALL.iter().map(ToolKind::definition).collect()
    }

    /// Tool names, in the same order as [`Self::describe_all`]
    pub fn names(&self) -> Vec<&'static str> {
        ToolKind::ALL.iter().map(ToolKind::name).collect()
    }

    /// Execute a tool call. Every failure becomes a failed result.
    pub async fn invoke(&self, call: &ToolCall) -> ToolResult {
        let invocation = match ToolInvocation::parse(call) {
            Ok(invocation) => invocation,
            Err(e) => {
                tracing::warn!(tool = %call.name, "rejected tool call: {}", e);
                return ToolResult::failure(&call.name, e.to_string());
            }
        };

        tracing::info!(
            tool = invocation.kind().name(),
            arguments = %call.arguments,
            "called"
        );

        match self.execute(&invocation).await {
            Ok(output) => ToolResult::success(&call.name, output),
            Err(e) => {
                // Lookup misses are normal model mistakes, not outages
                if e.is_lookup() {
                    tracing::info!(tool = %call.name, "lookup failed: {}", e);
                } else {
                    tracing::warn!(tool = %call.name, "tool failed: {}", e);
                }
                ToolResult::failure(&call.name, format!("Error: {}", e))
            }
        }
    }

    async fn execute(&self, invocation: &ToolInvocation) -> Result<String> {
        match invocation {
            ToolInvocation::Search(args) => {
                let max = args
                    .max_results
                    .unwrap_or_else(|| self.search.default_max_results());
                let results = self.search.search(&args.query, max).await?;

                if results.is_empty() {
                    Ok(format!("No results found for '{}'.", args.query.trim()))
                } else {
                    Ok(serde_json::to_string(&results)?)
                }
            }
            ToolInvocation::Fetch(args) => match self.fetcher.fetch(&args.url).await {
                Some(content) => Ok(content.render()),
                None => Err(StewardError::fetch(format!(
                    "could not retrieve {}",
                    args.url
                ))),
            },
            ToolInvocation::StockInfo { symbol, field } => {
                match self.stocks.get_field(symbol, *field).await? {
                    Value::String(text) => Ok(text),
                    other => Ok(other.to_string()),
                }
            }
        }
    }
}
