use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use shared_types::{
    AppError, GlobalSearchRequest, GlobalSearchResponse, RecentSearch, SearchClickEvent,
};
use std::sync::Arc;

use crate::auth::extractors::AuthRequired;
use crate::error_convert::ValidateRequest;
use crate::search::{SearchAnalytics, SearchEngine};

/// POST /api/search
///
/// Runs one query across every source the caller may see. Sources that fail
/// or time out are left out of the response rather than failing the request.
#[utoipa::path(
    post,
    path = "/api/search",
    request_body = GlobalSearchRequest,
    responses(
        (status = 200, description = "Ranked results grouped by type", body = GlobalSearchResponse),
        (status = 400, description = "Malformed body", body = AppError),
        (status = 401, description = "Not authenticated", body = AppError)
    ),
    tag = "search"
)]
pub async fn global_search(
    State(engine): State<Arc<SearchEngine>>,
    auth: AuthRequired,
    body: Result<Json<GlobalSearchRequest>, JsonRejection>,
) -> Result<Json<GlobalSearchResponse>, AppError> {
    let Json(request) = body.map_err(|e| AppError::bad_request(e.body_text()))?;
    let response = engine.search(&request, &auth.caller()).await;
    Ok(Json(response))
}

/// GET /api/search/recent
#[utoipa::path(
    get,
    path = "/api/search/recent",
    responses(
        (status = 200, description = "Caller's recent searches, newest first", body = Vec<RecentSearch>),
        (status = 401, description = "Not authenticated", body = AppError)
    ),
    tag = "search"
)]
pub async fn recent_searches(
    State(engine): State<Arc<SearchEngine>>,
    auth: AuthRequired,
) -> Result<Json<Vec<RecentSearch>>, AppError> {
    let recent = engine.recent(auth.0.sub).await?;
    Ok(Json(recent))
}

/// POST /api/search/clicks
///
/// Records which result the user opened for a query.
#[utoipa::path(
    post,
    path = "/api/search/clicks",
    request_body = SearchClickEvent,
    responses(
        (status = 204, description = "Click recorded"),
        (status = 400, description = "Malformed body", body = AppError),
        (status = 422, description = "Event failed validation", body = AppError),
        (status = 401, description = "Not authenticated", body = AppError)
    ),
    tag = "search"
)]
pub async fn record_click(
    State(analytics): State<Arc<dyn SearchAnalytics>>,
    auth: AuthRequired,
    body: Result<Json<SearchClickEvent>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(event) = body.map_err(|e| AppError::bad_request(e.body_text()))?;
    event.validate_request()?;
    analytics.record_click(&auth.caller(), &event).await?;
    Ok(StatusCode::NO_CONTENT)
}
