//! Per-user recent-search list.
//!
//! Writes are idempotent per `(user, query)`: re-running a query only moves it
//! to the front. Each user keeps at most `retention` entries.

use async_trait::async_trait;
use chrono::Utc;
use shared_types::{AppError, RecentSearch};
use sqlx::{Pool, Postgres};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

/// Stored queries longer than this are cut.
pub const MAX_STORED_QUERY_CHARS: usize = 200;

#[async_trait]
pub trait SearchHistory: Send + Sync {
    async fn record(&self, user_id: Uuid, query: &str) -> Result<(), AppError>;

    /// Most recent first.
    async fn recent(&self, user_id: Uuid, limit: usize) -> Result<Vec<RecentSearch>, AppError>;
}

/// Trim and cap a query for storage. `None` when nothing is left.
pub fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_STORED_QUERY_CHARS).collect())
}

/// `recent_searches` table, unique on `(user_id, query)`.
pub struct PgSearchHistory {
    pool: Pool<Postgres>,
    retention: usize,
}

impl PgSearchHistory {
    pub fn new(pool: Pool<Postgres>, retention: usize) -> Self {
        Self { pool, retention }
    }
}

#[async_trait]
impl SearchHistory for PgSearchHistory {
    async fn record(&self, user_id: Uuid, query: &str) -> Result<(), AppError> {
        let Some(query) = normalize_query(query) else {
            return Ok(());
        };
        let retention = i64::try_from(self.retention).unwrap_or(i64::MAX);

        let mut tx = self.pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;

        // Held until commit: one history writer per user at a time.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;

        sqlx::query(
            "INSERT INTO recent_searches (user_id, query, searched_at) VALUES ($1, $2, NOW()) \
             ON CONFLICT (user_id, query) DO UPDATE SET searched_at = EXCLUDED.searched_at",
        )
        .bind(user_id)
        .bind(&query)
        .execute(&mut *tx)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

        sqlx::query(
            "DELETE FROM recent_searches WHERE user_id = $1 AND id NOT IN ( \
                SELECT id FROM recent_searches WHERE user_id = $1 \
                ORDER BY searched_at DESC, id DESC LIMIT $2)",
        )
        .bind(user_id)
        .bind(retention)
        .execute(&mut *tx)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

        tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;
        Ok(())
    }

    async fn recent(&self, user_id: Uuid, limit: usize) -> Result<Vec<RecentSearch>, AppError> {
        let limit = i64::try_from(limit.min(self.retention)).unwrap_or(i64::MAX);
        sqlx::query_as::<_, RecentSearch>(
            "SELECT query, searched_at FROM recent_searches WHERE user_id = $1 \
             ORDER BY searched_at DESC, id DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)
    }
}

/// Process-local history for tests and database-less runs.
pub struct MemorySearchHistory {
    retention: usize,
    entries: Mutex<HashMap<Uuid, VecDeque<RecentSearch>>>,
}

impl MemorySearchHistory {
    pub fn new(retention: usize) -> Self {
        Self {
            retention,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SearchHistory for MemorySearchHistory {
    async fn record(&self, user_id: Uuid, query: &str) -> Result<(), AppError> {
        let Some(query) = normalize_query(query) else {
            return Ok(());
        };
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let list = entries.entry(user_id).or_default();
        list.retain(|e| e.query != query);
        list.push_front(RecentSearch {
            query,
            searched_at: Utc::now(),
        });
        list.truncate(self.retention);
        Ok(())
    }

    async fn recent(&self, user_id: Uuid, limit: usize) -> Result<Vec<RecentSearch>, AppError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries
            .get(&user_id)
            .map(|list| list.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}
