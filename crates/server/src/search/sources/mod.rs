//! Per-entity search sources.
//!
//! A source turns one [`SourceQuery`] into an ordered list of [`SourceHit`]s.
//! Ranking is positional: the engine gives each hit `base - index`, so a
//! source only has to return its rows in the order it wants them shown.

mod agents;
mod calls;
mod leads;
mod staff;

pub use agents::AgentSource;
pub use calls::CallSource;
pub use leads::LeadSource;
pub use staff::StaffSource;

use async_trait::async_trait;
use serde_json::Value;
use shared_types::{AppError, Intent, IntentSet, ResultType, SearchResult, TenantScope};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::sanitize::{build_prefix_expression, like_pattern, sanitize};

/// A query after classification and sanitization, shared by every source.
#[derive(Debug, Clone)]
pub struct SourceQuery {
    /// Trimmed query as typed.
    pub raw: String,
    /// Query with search-syntax characters removed.
    pub sanitized: String,
    /// `to_tsquery` prefix expression, empty when nothing is searchable.
    pub prefix: String,
    pub intents: IntentSet,
    pub scope: TenantScope,
    /// Per-source row cap.
    pub limit: usize,
}

impl SourceQuery {
    pub fn new(raw: &str, intents: IntentSet, scope: TenantScope, limit: usize) -> Self {
        let raw = raw.trim().to_string();
        Self {
            sanitized: sanitize(&raw),
            prefix: build_prefix_expression(&raw),
            raw,
            intents,
            scope,
            limit,
        }
    }

    /// Substring pattern for `ILIKE` built from the sanitized query.
    pub fn like(&self) -> String {
        like_pattern(&self.sanitized)
    }

    pub fn limit_i64(&self) -> i64 {
        i64::try_from(self.limit).unwrap_or(i64::MAX)
    }
}

/// A source's hit before ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceHit {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub path: String,
    pub metadata: Option<Value>,
}

impl SourceHit {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            subtitle: subtitle.into(),
            path: path.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// One searchable entity type.
#[async_trait]
pub trait SearchSource: Send + Sync {
    fn result_type(&self) -> ResultType;

    /// Sources holding administrative data are skipped for unprivileged callers.
    fn requires_privilege(&self) -> bool {
        false
    }

    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<SourceHit>, AppError>;
}

/// Attach `base_priority - index` to each hit, preserving source order.
pub fn rank(result_type: ResultType, hits: Vec<SourceHit>) -> Vec<SearchResult> {
    let base = result_type.base_priority();
    hits.into_iter()
        .enumerate()
        .map(|(index, hit)| SearchResult {
            id: hit.id,
            result_type,
            title: hit.title,
            subtitle: hit.subtitle,
            path: hit.path,
            priority: base.saturating_sub(i32::try_from(index).unwrap_or(i32::MAX)),
            metadata: hit.metadata,
        })
        .collect()
}

/// Which column family a contact-style source should filter on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Substring match on the email column only.
    Email(String),
    /// Digit-only substring match on the phone column only.
    Phone(String),
    /// Exact primary-key match.
    Id(Uuid),
    /// Substring match across every text column, plus the prefix expression.
    Text { pattern: String, prefix: String },
}

impl MatchStrategy {
    /// Email wins over phone, phone over id, and anything else is free text.
    pub fn choose(query: &SourceQuery) -> Self {
        if query.intents.contains(Intent::Email) {
            return MatchStrategy::Email(query.like());
        }
        if query.intents.contains(Intent::Phone) {
            let digits: String = query.raw.chars().filter(char::is_ascii_digit).collect();
            if !digits.is_empty() {
                return MatchStrategy::Phone(format!("%{digits}%"));
            }
        }
        if query.intents.contains(Intent::Id) {
            if let Ok(id) = Uuid::parse_str(&query.raw) {
                return MatchStrategy::Id(id);
            }
        }
        MatchStrategy::Text {
            pattern: query.like(),
            prefix: query.prefix.clone(),
        }
    }
}

/// Append `AND <column> = $tenant` unless the scope spans every tenant.
pub(crate) fn push_tenant_filter(qb: &mut QueryBuilder<'_, Postgres>, column: &str, scope: TenantScope) {
    if let Some(tenant_id) = scope.tenant_id() {
        qb.push(format!(" AND {column} = ")).push_bind(tenant_id);
    }
}

/// `"a · b"` from whichever parts are present.
pub(crate) fn join_parts<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    parts
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" · ")
}
