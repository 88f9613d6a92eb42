use axum::http::StatusCode;

use crate::common;

#[tokio::test]
async fn health_reports_degraded_without_a_database() {
    let app = common::test_app();
    let (status, body) = common::get(&app.router, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn api_docs_are_served() {
    let app = common::test_app();
    let (status, body) = common::get(&app.router, "/docs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body
        .as_str()
        .is_some_and(|html| html.to_lowercase().contains("scalar")));
}

#[tokio::test]
async fn unknown_api_route_is_not_found() {
    let app = common::test_app();
    let (_, token) = common::caller(shared_types::UserRole::Member);
    let (status, _) = common::get(&app.router, "/api/search/everything", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
