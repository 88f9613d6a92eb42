use dioxus::prelude::*;
use shared_types::{
    GlobalSearchRequest, GlobalSearchResponse, RecentSearch, SearchClickEvent, SearchSettings,
};

#[cfg(feature = "server")]
use crate::db::get_state;

#[cfg(feature = "server")]
use crate::error_convert::{AppErrorExt, ValidateRequest};

// ── Auth helpers for server functions ──────────────────

/// Extract and validate the caller's identity from the current request.
/// Checks middleware-injected Claims first, falls back to header/cookie parsing.
/// Returns the validated Claims or an "Authentication required" error.
#[cfg(feature = "server")]
fn require_auth() -> Result<crate::auth::jwt::Claims, ServerFnError> {
    use crate::auth::{cookies, jwt};
    use shared_types::AppError;

    let ctx = dioxus::fullstack::FullstackContext::current()
        .ok_or_else(|| AppError::unauthorized("Authentication required").into_server_fn_error())?;

    let parts = ctx.parts_mut();

    // Primary: Claims already validated by auth middleware
    if let Some(claims) = parts.extensions.get::<jwt::Claims>() {
        return Ok(claims.clone());
    }

    // Fallback: parse access token from Bearer header/cookies
    let headers = parts.headers.clone();
    let token = cookies::extract_access_token(&headers)
        .ok_or_else(|| AppError::unauthorized("Authentication required").into_server_fn_error())?;

    jwt::validate_access_token(&token)
        .map_err(|_| AppError::unauthorized("Invalid or expired token").into_server_fn_error())
}

/// Search tunables the client needs (debounce, minimum length, default limit).
/// No auth required; nothing here is sensitive.
#[server]
pub async fn get_search_settings() -> Result<SearchSettings, ServerFnError> {
    Ok(crate::config::search_settings().clone())
}

/// Run a global search for the signed-in user.
#[cfg_attr(feature = "server", tracing::instrument(skip_all))]
#[server]
pub async fn global_search(
    request: GlobalSearchRequest,
) -> Result<GlobalSearchResponse, ServerFnError> {
    let claims = require_auth()?;
    let state = get_state().await.map_err(|e| e.into_server_fn_error())?;
    Ok(state.search.search(&request, &claims.caller()).await)
}

/// The signed-in user's recent searches, newest first.
#[server]
pub async fn recent_searches() -> Result<Vec<RecentSearch>, ServerFnError> {
    let claims = require_auth()?;
    let state = get_state().await.map_err(|e| e.into_server_fn_error())?;
    state
        .search
        .recent(claims.sub)
        .await
        .map_err(|e| e.into_server_fn_error())
}

/// Record that the user opened a search result.
#[server]
pub async fn record_search_click(event: SearchClickEvent) -> Result<(), ServerFnError> {
    let claims = require_auth()?;
    event
        .validate_request()
        .map_err(|e| e.into_server_fn_error())?;
    let state = get_state().await.map_err(|e| e.into_server_fn_error())?;
    state
        .analytics
        .record_click(&claims.caller(), &event)
        .await
        .map_err(|e| e.into_server_fn_error())
}
