//! Tools module - Tool implementations for the agent
//!
//! Contains the search, fetch and stock clients and the tool registry.

pub mod fetch;
pub mod registry;
pub mod search;
pub mod stock;

pub use fetch::{PageContent, PageFetcher};
pub use registry::{ToolInvocation, ToolKind, ToolRegistry};
pub use search::{SearchClient, SearchResult};
pub use stock::{StockField, StockInfoClient};
