use async_trait::async_trait;
use serde_json::json;
use shared_types::{AppError, ResultType, UserRole};
use sqlx::{FromRow, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{join_parts, push_tenant_filter, MatchStrategy, SearchSource, SourceHit, SourceQuery};
use crate::error_convert::SqlxErrorExt;

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: Uuid,
    full_name: Option<String>,
    email: Option<String>,
    role: Option<String>,
}

impl ProfileRow {
    fn into_hit(self) -> SourceHit {
        let title = self
            .full_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .or(self.email.as_deref())
            .unwrap_or("Unnamed user")
            .to_string();
        let role = UserRole::from_str_or_default(self.role.as_deref().unwrap_or_default());
        let subtitle = join_parts([self.email.as_deref(), Some(role_label(role))]);
        SourceHit::new(self.id.to_string(), title, subtitle, format!("/team/{}", self.id))
            .with_metadata(json!({ "role": role.as_str() }))
    }
}

fn role_label(role: UserRole) -> &'static str {
    match role {
        UserRole::Member => "Member",
        UserRole::Manager => "Manager",
        UserRole::Admin => "Admin",
        UserRole::SuperAdmin => "Super Admin",
    }
}

/// Staff accounts. Only visible to administrators.
pub struct StaffSource {
    pool: Pool<Postgres>,
}

impl StaffSource {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchSource for StaffSource {
    fn result_type(&self) -> ResultType {
        ResultType::User
    }

    fn requires_privilege(&self) -> bool {
        true
    }

    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<SourceHit>, AppError> {
        if query.scope.is_unassigned() {
            return Ok(Vec::new());
        }

        let mut qb =
            QueryBuilder::<Postgres>::new("SELECT id, full_name, email, role FROM profiles WHERE TRUE");
        push_tenant_filter(&mut qb, "company_id", query.scope);

        match MatchStrategy::choose(query) {
            MatchStrategy::Email(pattern) => {
                qb.push(" AND email ILIKE ").push_bind(pattern);
            }
            MatchStrategy::Id(id) => {
                qb.push(" AND id = ").push_bind(id);
            }
            // Profiles carry no phone number, so a phone query is plain text here.
            MatchStrategy::Phone(_) | MatchStrategy::Text { .. } => {
                let pattern = query.like();
                qb.push(" AND (full_name ILIKE ").push_bind(pattern.clone());
                qb.push(" OR email ILIKE ").push_bind(pattern).push(")");
            }
        }

        qb.push(" ORDER BY full_name ASC NULLS LAST LIMIT ")
            .push_bind(query.limit_i64());

        let rows: Vec<ProfileRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;

        tracing::debug!(count = rows.len(), "Staff source matched");
        Ok(rows.into_iter().map(ProfileRow::into_hit).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_shows_email_and_role() {
        let hit = ProfileRow {
            id: Uuid::nil(),
            full_name: Some("John Admin".into()),
            email: Some("john@acme.com".into()),
            role: Some("super_admin".into()),
        }
        .into_hit();
        assert_eq!(hit.title, "John Admin");
        assert_eq!(hit.subtitle, "john@acme.com · Super Admin");
        assert_eq!(hit.path, format!("/team/{}", Uuid::nil()));
    }

    #[test]
    fn unknown_role_reads_as_member() {
        let hit = ProfileRow {
            id: Uuid::nil(),
            full_name: None,
            email: Some("a@b.co".into()),
            role: Some("owner".into()),
        }
        .into_hit();
        assert_eq!(hit.title, "a@b.co");
        assert_eq!(hit.subtitle, "a@b.co · Member");
    }
}
