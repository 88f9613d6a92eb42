use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use shared_types::{AppError, ResultType};
use sqlx::{FromRow, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{push_tenant_filter, MatchStrategy, SearchSource, SourceHit, SourceQuery};
use crate::error_convert::SqlxErrorExt;

const SUMMARY_PREVIEW_CHARS: usize = 80;

#[derive(Debug, FromRow)]
struct CallRow {
    id: Uuid,
    status: Option<String>,
    summary: Option<String>,
    duration_seconds: Option<i32>,
    created_at: DateTime<Utc>,
    lead_name: Option<String>,
}

impl CallRow {
    fn into_hit(self) -> SourceHit {
        let who = self
            .lead_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("unknown lead");
        let title = format!("Call with {who}");

        let subtitle = match self.summary.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(summary) => preview(summary),
            None => {
                let status = self.status.as_deref().unwrap_or("unknown");
                match self.duration_seconds {
                    Some(secs) => format!("{status} · {}m {}s", secs / 60, secs % 60),
                    None => status.to_string(),
                }
            }
        };

        SourceHit::new(self.id.to_string(), title, subtitle, format!("/calls/{}", self.id))
            .with_metadata(json!({ "createdAt": self.created_at }))
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= SUMMARY_PREVIEW_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(SUMMARY_PREVIEW_CHARS).collect();
    format!("{}…", cut.trim_end())
}

/// Call records matched on transcript or summary, newest first.
pub struct CallSource {
    pool: Pool<Postgres>,
}

impl CallSource {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchSource for CallSource {
    fn result_type(&self) -> ResultType {
        ResultType::Call
    }

    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<SourceHit>, AppError> {
        if query.scope.is_unassigned() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT c.id, c.status, c.summary, c.duration_seconds, c.created_at, l.name AS lead_name \
             FROM calls c LEFT JOIN leads l ON l.id = c.lead_id WHERE TRUE",
        );
        push_tenant_filter(&mut qb, "c.company_id", query.scope);

        match MatchStrategy::choose(query) {
            MatchStrategy::Id(id) => {
                qb.push(" AND c.id = ").push_bind(id);
            }
            _ => {
                let pattern = query.like();
                qb.push(" AND (c.transcript ILIKE ").push_bind(pattern.clone());
                qb.push(" OR c.summary ILIKE ").push_bind(pattern).push(")");
            }
        }

        qb.push(" ORDER BY c.created_at DESC LIMIT ")
            .push_bind(query.limit_i64());

        let rows: Vec<CallRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;

        tracing::debug!(count = rows.len(), "Call source matched");
        Ok(rows.into_iter().map(CallRow::into_hit).collect())
    }
}
