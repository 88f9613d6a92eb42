//! Global search across leads, staff, agents, calls and the static catalogues.
//!
//! The [`engine::SearchEngine`] classifies and sanitizes a query once, fans it
//! out to every permitted [`sources::SearchSource`], and merges the ranked
//! hits into a single [`shared_types::GlobalSearchResponse`].

pub mod analytics;
pub mod catalogue;
pub mod engine;
pub mod history;
pub mod intent;
pub mod sanitize;
pub mod sources;

pub use analytics::{MemorySearchAnalytics, PgSearchAnalytics, SearchAnalytics};
pub use engine::SearchEngine;
pub use history::{MemorySearchHistory, PgSearchHistory, SearchHistory};
pub use sources::{SearchSource, SourceHit, SourceQuery};
