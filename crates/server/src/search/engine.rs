//! Fan-out, merge and ranking.

use shared_types::{
    AppError, CallerContext, CategoryMap, FilterSet, GlobalSearchRequest, GlobalSearchResponse,
    IntentSet, RecentSearch, ResultType, SearchResult, SearchSettings,
};
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::catalogue;
use super::history::{PgSearchHistory, SearchHistory};
use super::intent::classify;
use super::sources::{
    rank, AgentSource, CallSource, LeadSource, SearchSource, SourceHit, SourceQuery, StaffSource,
};

/// Runs a global search for one caller.
pub struct SearchEngine {
    sources: Vec<Arc<dyn SearchSource>>,
    history: Arc<dyn SearchHistory>,
    settings: SearchSettings,
}

impl SearchEngine {
    /// Sources are queried concurrently but merged in the order given here.
    pub fn new(
        sources: Vec<Arc<dyn SearchSource>>,
        history: Arc<dyn SearchHistory>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            sources,
            history,
            settings,
        }
    }

    /// Postgres-backed engine: leads, staff, agents, calls.
    pub fn postgres(pool: Pool<Postgres>, settings: SearchSettings) -> Self {
        let sources: Vec<Arc<dyn SearchSource>> = vec![
            Arc::new(LeadSource::new(pool.clone())),
            Arc::new(StaffSource::new(pool.clone())),
            Arc::new(AgentSource::new(pool.clone())),
            Arc::new(CallSource::new(pool.clone())),
        ];
        let history = Arc::new(PgSearchHistory::new(pool, settings.history_retention));
        Self::new(sources, history, settings)
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn history(&self) -> &Arc<dyn SearchHistory> {
        &self.history
    }

    /// Never fails: a source that errors, panics or times out contributes nothing.
    #[tracing::instrument(
        name = "global_search",
        skip_all,
        fields(user_id = %caller.user_id, role = caller.role.as_str(), total = tracing::field::Empty)
    )]
    pub async fn search(
        &self,
        request: &GlobalSearchRequest,
        caller: &CallerContext,
    ) -> GlobalSearchResponse {
        let query = request.query.trim();
        if !self.settings.is_searchable(query) {
            return GlobalSearchResponse::empty(query);
        }

        let limit = self.settings.effective_limit(request.limit);
        let filters = request.filter_set();
        let intents = classify(query);
        let source_query = Arc::new(SourceQuery::new(query, intents.clone(), caller.scope(), limit));

        if source_query.sanitized.is_empty() {
            tracing::debug!("Query has no searchable characters");
            return GlobalSearchResponse {
                intents,
                ..GlobalSearchResponse::empty(query)
            };
        }

        let mut merged = self
            .fan_out(&source_query, &filters, caller.is_privileged())
            .await;

        if filters.allows(ResultType::Setting) {
            merged.extend(rank(
                ResultType::Setting,
                catalogue::match_settings(&source_query.sanitized),
            ));
        }
        // Navigation is always offered, whatever the filters say.
        merged.extend(rank(
            ResultType::Navigation,
            catalogue::match_navigation(&source_query.sanitized),
        ));

        let response = assemble(query, intents, merged, limit);
        tracing::Span::current().record("total", response.total_count);

        self.spawn_history_write(caller.user_id, query);
        response
    }

    /// Recent searches for `user_id`, capped at the configured retention.
    pub async fn recent(&self, user_id: Uuid) -> Result<Vec<RecentSearch>, AppError> {
        self.history
            .recent(user_id, self.settings.history_retention)
            .await
    }

    async fn fan_out(
        &self,
        query: &Arc<SourceQuery>,
        filters: &FilterSet,
        privileged: bool,
    ) -> Vec<SearchResult> {
        let timeout = Duration::from_millis(self.settings.source_timeout_ms);

        let tasks: Vec<(ResultType, JoinHandle<Result<Vec<SourceHit>, AppError>>)> = self
            .sources
            .iter()
            .filter(|source| filters.allows(source.result_type()))
            .filter(|source| privileged || !source.requires_privilege())
            .map(|source| {
                let result_type = source.result_type();
                let source = Arc::clone(source);
                let query = Arc::clone(query);
                let handle = tokio::spawn(async move {
                    match tokio::time::timeout(timeout, source.fetch(&query)).await {
                        Ok(result) => result,
                        Err(_) => Err(AppError::timeout(format!(
                            "{result_type} source exceeded {}ms",
                            timeout.as_millis()
                        ))),
                    }
                });
                (result_type, handle)
            })
            .collect();

        let mut merged = Vec::new();
        for (result_type, handle) in tasks {
            match handle.await {
                Ok(Ok(hits)) => merged.extend(rank(result_type, hits)),
                Ok(Err(e)) => {
                    tracing::warn!(source = %result_type, error = %e, "Search source failed");
                }
                Err(e) => {
                    tracing::error!(source = %result_type, error = %e, "Search source task aborted");
                }
            }
        }
        merged
    }

    fn spawn_history_write(&self, user_id: Uuid, query: &str) {
        let history = Arc::clone(&self.history);
        let query = query.to_string();
        tokio::spawn(async move {
            if let Err(e) = history.record(user_id, &query).await {
                tracing::warn!(%user_id, error = %e, "Failed to record recent search");
            }
        });
    }
}

/// Stable-sort by priority, group into categories, then cap the flat list.
///
/// Equal priorities keep merge order. Categories and `total_count` are taken
/// before the cap.
pub fn assemble(
    query: &str,
    intents: IntentSet,
    mut merged: Vec<SearchResult>,
    limit: usize,
) -> GlobalSearchResponse {
    merged.sort_by(|a, b| b.priority.cmp(&a.priority));
    let categories: CategoryMap = merged.iter().cloned().collect();
    let total_count = merged.len();
    merged.truncate(limit);
    GlobalSearchResponse {
        results: merged,
        categories,
        total_count,
        query: query.to_string(),
        intents,
    }
}
