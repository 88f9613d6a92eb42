use axum::extract::FromRef;
use shared_types::AppError;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use crate::error_convert::SqlxErrorExt;
use crate::search::{PgSearchAnalytics, SearchAnalytics, SearchEngine};

/// Shared application state passed to Axum handlers via `State`.
/// Derives `FromRef` so handlers can extract `State<Arc<SearchEngine>>` directly.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub pool: Pool<Postgres>,
    pub search: Arc<SearchEngine>,
    pub analytics: Arc<dyn SearchAnalytics>,
}

impl AppState {
    /// Postgres-backed search, history and analytics over one pool.
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        let settings = crate::config::search_settings().clone();
        Self {
            search: Arc::new(SearchEngine::postgres(pool.clone(), settings)),
            analytics: Arc::new(PgSearchAnalytics::new(pool.clone())),
            pool,
        }
    }
}

/// State shared by server functions, which have no `State` extractor.
static STATE: OnceLock<AppState> = OnceLock::new();
static MIGRATED: AtomicBool = AtomicBool::new(false);

/// Create a connection pool from environment variables.
/// Uses `connect_lazy` so no connections open until the first query.
pub fn create_pool() -> Result<Pool<Postgres>, sqlx::Error> {
    // Load .env file if present (ignored in production where env vars are set directly).
    let _ = dotenvy::dotenv();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| sqlx::Error::Configuration("DATABASE_URL must be set".into()))?;

    let max_connections: u32 = std::env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect_lazy(&database_url)
}

/// Run database migrations against the given pool.
pub async fn run_migrations(pool: &Pool<Postgres>) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// Register the process-wide state. The first call wins; later calls return
/// the state already installed.
pub fn install_state(state: AppState) -> &'static AppState {
    STATE.get_or_init(|| state)
}

/// Get or lazily build the process-wide state.
/// Migrations run at most once per process.
///
/// Used by Dioxus server functions (`api.rs`). REST handlers receive the same
/// state through `State` instead.
pub async fn get_state() -> Result<&'static AppState, AppError> {
    let state = match STATE.get() {
        Some(state) => state,
        None => {
            let pool = create_pool().map_err(SqlxErrorExt::into_app_error)?;
            install_state(AppState::postgres(pool))
        }
    };

    if !MIGRATED.swap(true, Ordering::SeqCst) {
        if let Err(e) = run_migrations(&state.pool).await {
            tracing::error!(error = %e, "Failed to run database migrations");
        }
    }

    Ok(state)
}

/// Mark migrations as already applied, e.g. after startup ran them.
pub fn mark_migrated() {
    MIGRATED.store(true, Ordering::SeqCst);
}
