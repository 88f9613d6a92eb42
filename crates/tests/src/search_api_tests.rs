use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use shared_types::{Intent, ResultType, UserRole};
use std::sync::Arc;

use crate::common::{self, TableSource};

fn ids(results: &[shared_types::SearchResult]) -> Vec<&str> {
    results.iter().map(|r| r.id.as_str()).collect()
}

#[tokio::test]
async fn search_without_token_is_unauthorized() {
    let app = common::test_app();
    let (status, body) =
        common::post_json(&app.router, "/api/search", r#"{"query":"acme"}"#, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "Unauthorized");
}

#[tokio::test]
async fn search_with_garbage_token_is_unauthorized() {
    let app = common::test_app();
    let (status, _) = common::post_json(
        &app.router,
        "/api/search",
        r#"{"query":"acme"}"#,
        Some("not-a-jwt"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_query_field_is_a_bad_request() {
    let app = common::test_app();
    let (_, token) = common::caller(UserRole::Member);
    let (status, body) =
        common::post_json(&app.router, "/api/search", r#"{"limit":5}"#, Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "BadRequest");

    let (status, _) =
        common::post_json(&app.router, "/api/search", "not json", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn short_queries_return_nothing_whatever_the_filters() {
    let app = common::test_app();
    let (_, token) = common::caller(UserRole::Admin);
    for body in [
        json!({"query": "a"}),
        json!({"query": " a "}),
        json!({"query": ""}),
        json!({"query": "s", "filters": ["settings", "navigation"]}),
    ] {
        let response = common::search(&app.router, &token, body).await;
        assert!(response.results.is_empty());
        assert!(response.categories.is_empty());
        assert_eq!(response.total_count, 0);
    }
}

#[tokio::test]
async fn non_string_query_and_negative_limit_fall_back_to_defaults() {
    let app = common::test_app();
    let (_, token) = common::caller(UserRole::Member);

    let response = common::search(&app.router, &token, json!({"query": 42})).await;
    assert!(response.results.is_empty());

    let response =
        common::search(&app.router, &token, json!({"query": "acme", "limit": -3})).await;
    assert_eq!(response.results.len(), 5);
}

#[tokio::test]
async fn results_are_capped_but_categories_hold_every_match() {
    let app = common::test_app();
    let (_, token) = common::caller(UserRole::Member);

    let response =
        common::search(&app.router, &token, json!({"query": "acme", "limit": 3})).await;

    // The flat list honours the limit...
    assert_eq!(ids(&response.results), vec!["lead-acme-1", "lead-acme-2", "lead-acme-3"]);
    // ...while the grouped view and the count cover every match.
    assert_eq!(response.total_count, 5);
    assert_eq!(response.categories.get(ResultType::Lead).map(|r| r.len()), Some(3));
    assert_eq!(response.categories.get(ResultType::Agent).map(|r| r.len()), Some(1));
    assert_eq!(response.categories.get(ResultType::Call).map(|r| r.len()), Some(1));
    assert_eq!(response.categories.total(), 5);
    assert!(response.results.len() <= response.categories.total());
}

#[tokio::test]
async fn results_are_sorted_by_priority_and_stable() {
    let app = common::test_app();
    let (_, token) = common::caller(UserRole::Member);

    let response = common::search(&app.router, &token, json!({"query": "acme"})).await;

    assert_eq!(
        ids(&response.results),
        vec!["lead-acme-1", "lead-acme-2", "lead-acme-3", "agent-acme", "call-jane"]
    );
    let priorities: Vec<i32> = response.results.iter().map(|r| r.priority).collect();
    assert_eq!(priorities, vec![100, 99, 98, 70, 60]);
}

#[tokio::test]
async fn failing_lead_source_leaves_the_rest_of_the_response() {
    let app = common::test_app_with(vec![
        Arc::new(TableSource::failing(ResultType::Lead)),
        Arc::new(common::agent_table()),
        Arc::new(common::call_table()),
    ]);
    let (_, token) = common::caller(UserRole::Member);

    let response = common::search(&app.router, &token, json!({"query": "acme"})).await;
    assert!(response.categories.get(ResultType::Lead).is_none());
    assert_eq!(ids(&response.results), vec!["agent-acme", "call-jane"]);

    let response = common::search(&app.router, &token, json!({"query": "voice"})).await;
    assert!(response.categories.get(ResultType::Navigation).is_some());
    assert!(response.categories.get(ResultType::Agent).is_some());
}

#[tokio::test]
async fn privileged_caller_sees_staff_accounts() {
    let app = common::test_app();
    let (_, token) = common::caller(UserRole::Admin);

    let response = common::search(&app.router, &token, json!({"query": "john"})).await;

    let leads = response.categories.get(ResultType::Lead).unwrap_or_default();
    let staff = response.categories.get(ResultType::User).unwrap_or_default();
    assert_eq!(ids(leads), vec!["lead-john"]);
    assert_eq!(ids(staff), vec!["user-john"]);
}

#[tokio::test]
async fn member_never_sees_staff_accounts() {
    let staff = Arc::new(common::staff_table());
    let app = common::test_app_with(vec![Arc::new(common::lead_table()), staff.clone()]);
    let (_, token) = common::caller(UserRole::Member);

    let response = common::search(&app.router, &token, json!({"query": "john"})).await;

    assert!(response.categories.get(ResultType::User).is_none());
    assert!(response.results.iter().all(|r| r.result_type != ResultType::User));
    assert_eq!(ids(&response.results), vec!["lead-john"]);
    // The staff table is not even consulted.
    assert_eq!(staff.fetches(), 0);
}

#[tokio::test]
async fn settings_query_is_served_by_the_static_catalogues() {
    let app = common::test_app_with(vec![
        Arc::new(TableSource::failing(ResultType::Lead)),
        Arc::new(TableSource::failing(ResultType::Agent)),
        Arc::new(TableSource::failing(ResultType::Call)),
    ]);
    let (_, token) = common::caller(UserRole::Member);

    let response = common::search(&app.router, &token, json!({"query": "settings"})).await;

    let settings = response.categories.get(ResultType::Setting).unwrap_or_default();
    let navigation = response.categories.get(ResultType::Navigation).unwrap_or_default();
    assert!(!settings.is_empty());
    assert_eq!(ids(navigation), vec!["nav-settings"]);
}

#[tokio::test]
async fn filters_narrow_sources_but_navigation_stays() {
    let app = common::test_app();
    let (_, token) = common::caller(UserRole::Member);

    let response = common::search(
        &app.router,
        &token,
        json!({"query": "calls", "filters": ["agents"]}),
    )
    .await;

    assert!(response.categories.get(ResultType::Call).is_none());
    assert!(response.categories.get(ResultType::Setting).is_none());
    assert_eq!(
        ids(response.categories.get(ResultType::Navigation).unwrap_or_default()),
        vec!["nav-calls"]
    );
}

#[tokio::test]
async fn repeated_search_is_idempotent() {
    let app = common::test_app();
    let (_, token) = common::caller(UserRole::Admin);
    let body = json!({"query": "john", "limit": 3});

    let first = common::search(&app.router, &token, body.clone()).await;
    let second = common::search(&app.router, &token, body).await;

    assert_eq!(first.results, second.results);
    assert_eq!(first.categories, second.categories);
    assert_eq!(first.total_count, second.total_count);
}

#[tokio::test]
async fn response_reports_detected_intents() {
    let app = common::test_app();
    let (_, token) = common::caller(UserRole::Member);

    let response =
        common::search(&app.router, &token, json!({"query": "john.smith@example.com"})).await;
    assert!(response.intents.contains(Intent::Email));

    let response = common::search(&app.router, &token, json!({"query": "hello world"})).await;
    assert!(response.intents.is_text_only());
}
