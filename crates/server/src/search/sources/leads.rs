use async_trait::async_trait;
use serde_json::json;
use shared_types::{AppError, ResultType};
use sqlx::{FromRow, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{join_parts, push_tenant_filter, MatchStrategy, SearchSource, SourceHit, SourceQuery};
use crate::error_convert::SqlxErrorExt;

#[derive(Debug, FromRow)]
struct LeadRow {
    id: Uuid,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    status: Option<String>,
}

impl LeadRow {
    fn into_hit(self) -> SourceHit {
        let title = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .or(self.email.as_deref())
            .unwrap_or("Unnamed lead")
            .to_string();
        let subtitle = join_parts([self.email.as_deref(), self.phone.as_deref()]);
        let mut hit = SourceHit::new(self.id.to_string(), title, subtitle, format!("/leads/{}", self.id));
        if let Some(status) = self.status {
            hit = hit.with_metadata(json!({ "status": status }));
        }
        hit
    }
}

/// Leads of the caller's company, most recently updated first.
pub struct LeadSource {
    pool: Pool<Postgres>,
}

impl LeadSource {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchSource for LeadSource {
    fn result_type(&self) -> ResultType {
        ResultType::Lead
    }

    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<SourceHit>, AppError> {
        if query.scope.is_unassigned() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, name, email, phone, status FROM leads WHERE TRUE",
        );
        push_tenant_filter(&mut qb, "company_id", query.scope);

        match MatchStrategy::choose(query) {
            MatchStrategy::Email(pattern) => {
                qb.push(" AND email ILIKE ").push_bind(pattern);
            }
            MatchStrategy::Phone(digits) => {
                qb.push(" AND regexp_replace(coalesce(phone, ''), '[^0-9]', '', 'g') LIKE ")
                    .push_bind(digits);
            }
            MatchStrategy::Id(id) => {
                qb.push(" AND id = ").push_bind(id);
            }
            MatchStrategy::Text { pattern, prefix } => {
                qb.push(" AND (name ILIKE ").push_bind(pattern.clone());
                qb.push(" OR email ILIKE ").push_bind(pattern.clone());
                qb.push(" OR phone ILIKE ").push_bind(pattern);
                if !prefix.is_empty() {
                    qb.push(" OR to_tsvector('simple', coalesce(name, '')) @@ to_tsquery('simple', ")
                        .push_bind(prefix)
                        .push(")");
                }
                qb.push(")");
            }
        }

        qb.push(" ORDER BY updated_at DESC LIMIT ")
            .push_bind(query.limit_i64());

        let rows: Vec<LeadRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;

        tracing::debug!(count = rows.len(), "Lead source matched");
        Ok(rows.into_iter().map(LeadRow::into_hit).collect())
    }
}
