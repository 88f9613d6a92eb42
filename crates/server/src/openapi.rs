use axum::Router;
use shared_types::{
    AppError, AppErrorKind, GlobalSearchRequest, GlobalSearchResponse, Intent, RecentSearch,
    ResultType, SearchClickEvent, SearchFilter, SearchResult,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable};

use crate::db::AppState;
use crate::health;
use crate::rest;

#[derive(OpenApi)]
#[openapi(
    paths(
        rest::search::global_search,
        rest::search::recent_searches,
        rest::search::record_click,
        health::health_check,
    ),
    components(schemas(
        AppError, AppErrorKind,
        GlobalSearchRequest, GlobalSearchResponse, SearchResult, ResultType, SearchFilter,
        Intent, RecentSearch, SearchClickEvent,
        health::HealthResponse,
    )),
    modifiers(&SecurityAddon),
    security(("bearer_auth" = [])),
    tags(
        (name = "search", description = "Global search across leads, staff, agents, calls, settings and navigation"),
        (name = "health", description = "Health check endpoint")
    ),
    info(
        title = "Lead CRM Search API",
        description = "Global multi-entity search for the lead-management CRM",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;

/// Registers the JWT bearer scheme referenced by `security`.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Build an Axum router that serves the API docs at `/docs`
/// and the REST API at `/api/*`.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .merge(rest::api_router())
        .route("/health", axum::routing::get(health::health_check))
        .with_state(state)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
}
