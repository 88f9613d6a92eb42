//! Result-click events, used to tune ranking offline.

use async_trait::async_trait;
use shared_types::{AppError, CallerContext, SearchClickEvent};
use sqlx::{Pool, Postgres};
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

#[async_trait]
pub trait SearchAnalytics: Send + Sync {
    async fn record_click(
        &self,
        caller: &CallerContext,
        event: &SearchClickEvent,
    ) -> Result<(), AppError>;
}

pub struct PgSearchAnalytics {
    pool: Pool<Postgres>,
}

impl PgSearchAnalytics {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchAnalytics for PgSearchAnalytics {
    async fn record_click(
        &self,
        caller: &CallerContext,
        event: &SearchClickEvent,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO search_analytics \
             (user_id, company_id, query, result_type, result_id, total_results) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(caller.user_id)
        .bind(caller.tenant_id)
        .bind(event.query.trim())
        .bind(event.result_type.as_str())
        .bind(&event.result_id)
        .bind(event.total_results)
        .execute(&self.pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;
        Ok(())
    }
}

/// A click captured by [`MemorySearchAnalytics`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedClick {
    pub user_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub event: SearchClickEvent,
}

#[derive(Default)]
pub struct MemorySearchAnalytics {
    clicks: Mutex<Vec<RecordedClick>>,
}

impl MemorySearchAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clicks(&self) -> Vec<RecordedClick> {
        self.clicks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SearchAnalytics for MemorySearchAnalytics {
    async fn record_click(
        &self,
        caller: &CallerContext,
        event: &SearchClickEvent,
    ) -> Result<(), AppError> {
        self.clicks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedClick {
                user_id: caller.user_id,
                tenant_id: caller.tenant_id,
                event: event.clone(),
            });
        Ok(())
    }
}
