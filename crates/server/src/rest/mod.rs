pub mod search;

use axum::{routing::{get, post}, Router};
use crate::db::AppState;

/// Build the REST API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/search", post(search::global_search))
        .route("/api/search/recent", get(search::recent_searches))
        .route("/api/search/clicks", post(search::record_click))
}
