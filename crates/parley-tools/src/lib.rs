//! Web page loading, web search and guarded SQL access.

pub mod config;
pub mod error;
pub mod fenced;
pub mod search;
pub mod sql;
pub mod web;

pub use config::{SearchConfig, SqlConfig, ToolsConfig, WebConfig};
pub use error::ToolError;
pub use search::{SearchHit, TavilySearch};
pub use sql::{QueryOutcome, REFUSAL, SqlDatabase, SqlGuard};
pub use web::WebPageLoader;
