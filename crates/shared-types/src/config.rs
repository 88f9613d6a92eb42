use serde::{Deserialize, Serialize};

/// Feature flags controlling which optional integrations are active.
///
/// Every field defaults to `false` so that a missing or incomplete
/// `config.toml` disables all optional features.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FeatureFlags {
    /// Export traces and logs over OTLP.
    #[serde(default)]
    pub telemetry: bool,
}

/// Tunables for the global search engine and its client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchSettings {
    /// Result cap used when a request omits `limit` or sends a non-positive one.
    pub default_limit: usize,
    /// Upper bound applied to any requested limit.
    pub max_limit: usize,
    /// Queries shorter than this (in characters, after trimming) return nothing.
    pub min_query_length: usize,
    /// Recent searches kept per user.
    pub history_retention: usize,
    /// Per-source deadline. A source that overruns contributes no results.
    pub source_timeout_ms: u64,
    /// Client keystroke debounce.
    pub debounce_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 50,
            min_query_length: 2,
            history_retention: 10,
            source_timeout_ms: 2_000,
            debounce_ms: 300,
        }
    }
}

impl SearchSettings {
    /// Resolve the requested limit: missing or non-positive values use the
    /// default, anything else is clamped to `max_limit`.
    pub fn effective_limit(&self, requested: Option<i64>) -> usize {
        match requested {
            Some(n) if n > 0 => (n as usize).min(self.max_limit.max(1)),
            _ => self.default_limit.max(1),
        }
    }

    /// True when `query` is long enough to search.
    pub fn is_searchable(&self, query: &str) -> bool {
        query.trim().chars().count() >= self.min_query_length
    }
}

/// Top-level config file structure matching `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub features: FeatureFlags,
    #[serde(default)]
    pub search: SearchSettings,
}
