use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use server::search::SearchHistory;
use shared_types::{ResultType, UserRole};

use crate::common;

fn queries(body: &Value) -> Vec<String> {
    body.as_array()
        .expect("array of recent searches")
        .iter()
        .map(|r| r["query"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn recent_searches_require_a_token() {
    let app = common::test_app();
    let (status, _) = common::get(&app.router, "/api/search/recent", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn executed_searches_show_up_newest_first() {
    let app = common::test_app();
    let (_, token) = common::caller(UserRole::Member);

    for query in ["acme", "  john  ", "acme"] {
        common::search(&app.router, &token, json!({ "query": query })).await;
        common::settle().await;
    }

    let (status, body) = common::get(&app.router, "/api/search/recent", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(queries(&body), vec!["acme", "john"]);
}

#[tokio::test]
async fn only_the_ten_most_recent_searches_are_kept() {
    let app = common::test_app();
    let (_, token) = common::caller(UserRole::Member);

    for n in 0..11 {
        common::search(&app.router, &token, json!({ "query": format!("query {n}") })).await;
        common::settle().await;
    }

    let (_, body) = common::get(&app.router, "/api/search/recent", Some(&token)).await;
    let kept = queries(&body);
    assert_eq!(kept.len(), 10);
    assert_eq!(kept.first().map(String::as_str), Some("query 10"));
    // The least recently touched query is the one dropped.
    assert!(!kept.iter().any(|q| q == "query 0"));
}

#[tokio::test]
async fn short_queries_are_not_remembered() {
    let app = common::test_app();
    let (user_id, token) = common::caller(UserRole::Member);

    common::search(&app.router, &token, json!({"query": "a"})).await;
    common::settle().await;

    let (_, body) = common::get(&app.router, "/api/search/recent", Some(&token)).await;
    assert!(queries(&body).is_empty());
    assert!(app.history.recent(user_id, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn search_writes_the_trimmed_query_to_the_store() {
    let app = common::test_app();
    let (user_id, token) = common::caller(UserRole::Admin);

    common::search(&app.router, &token, json!({"query": "  john  "})).await;
    common::settle().await;

    let stored = app.history.recent(user_id, 10).await.unwrap();
    let stored: Vec<&str> = stored.iter().map(|r| r.query.as_str()).collect();
    assert_eq!(stored, vec!["john"]);
}

#[tokio::test]
async fn history_is_per_caller() {
    let app = common::test_app();
    let (_, alice) = common::caller(UserRole::Member);
    let (_, bob) = common::caller(UserRole::Member);

    common::search(&app.router, &alice, json!({"query": "acme"})).await;
    common::settle().await;

    let (_, body) = common::get(&app.router, "/api/search/recent", Some(&bob)).await;
    assert!(queries(&body).is_empty());
}

#[tokio::test]
async fn click_is_recorded_for_the_caller() {
    let app = common::test_app();
    let (user_id, token) = common::caller(UserRole::Member);
    let body = json!({
        "query": "acme",
        "result_type": "lead",
        "result_id": "lead-acme-1",
        "total_results": 5,
    });

    let (status, _) =
        common::post_json(&app.router, "/api/search/clicks", &body.to_string(), Some(&token))
            .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let clicks = app.analytics.clicks();
    assert_eq!(clicks.len(), 1);
    assert_eq!(clicks[0].user_id, user_id);
    assert_eq!(clicks[0].tenant_id, Some(common::TENANT));
    assert_eq!(clicks[0].event.result_type, ResultType::Lead);
}

#[tokio::test]
async fn invalid_click_is_rejected() {
    let app = common::test_app();
    let (_, token) = common::caller(UserRole::Member);
    let body = json!({
        "query": "",
        "result_type": "lead",
        "result_id": "lead-acme-1",
        "total_results": -1,
    });

    let (status, response) =
        common::post_json(&app.router, "/api/search/clicks", &body.to_string(), Some(&token))
            .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["kind"], "ValidationError");
    assert!(app.analytics.clicks().is_empty());
}

#[tokio::test]
async fn click_with_unknown_result_type_is_a_bad_request() {
    let app = common::test_app();
    let (_, token) = common::caller(UserRole::Member);
    let body = json!({
        "query": "acme",
        "result_type": "invoice",
        "result_id": "x",
        "total_results": 1,
    });

    let (status, _) =
        common::post_json(&app.router, "/api/search/clicks", &body.to_string(), Some(&token))
            .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
