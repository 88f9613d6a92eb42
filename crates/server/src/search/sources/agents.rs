use async_trait::async_trait;
use serde_json::json;
use shared_types::{AppError, ResultType};
use sqlx::{FromRow, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{join_parts, push_tenant_filter, MatchStrategy, SearchSource, SourceHit, SourceQuery};
use crate::error_convert::SqlxErrorExt;

#[derive(Debug, FromRow)]
struct AgentRow {
    id: Uuid,
    name: String,
    voice: Option<String>,
    is_active: bool,
}

impl AgentRow {
    fn into_hit(self) -> SourceHit {
        let state = if self.is_active { "Active" } else { "Inactive" };
        let subtitle = join_parts([self.voice.as_deref(), Some(state)]);
        SourceHit::new(self.id.to_string(), self.name, subtitle, format!("/agents/{}", self.id))
            .with_metadata(json!({ "active": self.is_active }))
    }
}

/// Voice agents configured for the caller's company, by name.
pub struct AgentSource {
    pool: Pool<Postgres>,
}

impl AgentSource {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchSource for AgentSource {
    fn result_type(&self) -> ResultType {
        ResultType::Agent
    }

    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<SourceHit>, AppError> {
        if query.scope.is_unassigned() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, name, voice, is_active FROM voice_agents WHERE TRUE",
        );
        push_tenant_filter(&mut qb, "company_id", query.scope);

        match MatchStrategy::choose(query) {
            MatchStrategy::Id(id) => {
                qb.push(" AND id = ").push_bind(id);
            }
            _ => {
                qb.push(" AND name ILIKE ").push_bind(query.like());
            }
        }

        qb.push(" ORDER BY name ASC LIMIT ").push_bind(query.limit_i64());

        let rows: Vec<AgentRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;

        tracing::debug!(count = rows.len(), "Agent source matched");
        Ok(rows.into_iter().map(AgentRow::into_hit).collect())
    }
}
