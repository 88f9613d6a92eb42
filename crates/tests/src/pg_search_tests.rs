//! Search against a real Postgres. Run with
//! `TEST_DATABASE_URL=... cargo test -p tests -- --ignored`.

use pretty_assertions::assert_eq;
use server::search::{PgSearchHistory, SearchEngine, SearchHistory};
use shared_types::{
    CallerContext, GlobalSearchRequest, ResultType, SearchResult, SearchSettings, UserRole,
};
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use uuid::Uuid;

use crate::common;

fn titles(results: Option<&[SearchResult]>) -> Vec<&str> {
    results
        .unwrap_or_default()
        .iter()
        .map(|r| r.title.as_str())
        .collect()
}

async fn seed_company(pool: &Pool<Postgres>, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO companies (id, name) VALUES ($1, $2)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await
        .expect("seed company");
    id
}

async fn seed_lead(pool: &Pool<Postgres>, company: Uuid, name: &str, email: &str, phone: &str) {
    sqlx::query(
        "INSERT INTO leads (id, company_id, name, email, phone) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(Uuid::new_v4())
    .bind(company)
    .bind(name)
    .bind(email)
    .bind(phone)
    .execute(pool)
    .await
    .expect("seed lead");
}

async fn seed_profile(pool: &Pool<Postgres>, company: Uuid, name: &str, role: &str) {
    sqlx::query(
        "INSERT INTO profiles (id, company_id, email, full_name, role) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(Uuid::new_v4())
    .bind(company)
    .bind(format!("{}@crm.test", name.to_lowercase().replace(' ', ".")))
    .bind(name)
    .bind(role)
    .execute(pool)
    .await
    .expect("seed profile");
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn john_scenario_against_postgres() {
    let (pool, _guard) = common::pg_pool().await;
    let tenant = seed_company(&pool, "Acme Realty").await;
    let other = seed_company(&pool, "Other Co").await;
    seed_lead(&pool, tenant, "John Smith", "john@acme.io", "+1 (555) 010-1000").await;
    seed_lead(&pool, other, "John Elsewhere", "john@other.io", "").await;
    seed_profile(&pool, tenant, "John Doe", "admin").await;

    let engine = SearchEngine::postgres(pool.clone(), SearchSettings::default());
    let request = GlobalSearchRequest::new("john");

    let admin = CallerContext::new(Uuid::new_v4(), Some(tenant), UserRole::Admin);
    let response = engine.search(&request, &admin).await;
    assert_eq!(titles(response.categories.get(ResultType::Lead)), vec!["John Smith"]);
    assert_eq!(titles(response.categories.get(ResultType::User)), vec!["John Doe"]);

    let member = CallerContext::new(Uuid::new_v4(), Some(tenant), UserRole::Member);
    let response = engine.search(&request, &member).await;
    assert_eq!(titles(response.categories.get(ResultType::Lead)), vec!["John Smith"]);
    assert!(response.categories.get(ResultType::User).is_none());
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn phone_and_email_queries_match_their_columns() {
    let (pool, _guard) = common::pg_pool().await;
    let tenant = seed_company(&pool, "Acme Realty").await;
    seed_lead(&pool, tenant, "John Smith", "john@acme.io", "+1 (555) 010-1000").await;
    seed_lead(&pool, tenant, "Jane Roe", "jane@roe.io", "555-999-0000").await;

    let engine = SearchEngine::postgres(pool.clone(), SearchSettings::default());
    let caller = CallerContext::new(Uuid::new_v4(), Some(tenant), UserRole::Member);

    let response = engine.search(&GlobalSearchRequest::new("555-010-1000"), &caller).await;
    assert_eq!(titles(response.categories.get(ResultType::Lead)), vec!["John Smith"]);

    let response = engine.search(&GlobalSearchRequest::new("jane@roe.io"), &caller).await;
    assert_eq!(titles(response.categories.get(ResultType::Lead)), vec!["Jane Roe"]);
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn postgres_history_keeps_ten_most_recent() {
    let (pool, _guard) = common::pg_pool().await;
    let history = PgSearchHistory::new(pool.clone(), 10);
    let user = Uuid::new_v4();

    for n in 0..11 {
        history.record(user, &format!("query {n}")).await.expect("record");
    }
    history.record(user, "query 5").await.expect("touch");

    let recent = history.recent(user, 10).await.expect("recent");
    let queries: Vec<&str> = recent.iter().map(|r| r.query.as_str()).collect();
    assert_eq!(queries.len(), 10);
    assert_eq!(queries[0], "query 5");
    assert!(!queries.contains(&"query 0"));

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recent_searches WHERE user_id = $1")
        .bind(user)
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(rows, 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore = "needs TEST_DATABASE_URL"]
async fn concurrent_history_writes_respect_retention() {
    let (pool, _guard) = common::pg_pool().await;
    let history = Arc::new(PgSearchHistory::new(pool.clone(), 10));
    let user = Uuid::new_v4();

    for n in 0..10 {
        history.record(user, &format!("seed {n}")).await.expect("seed");
    }

    let writers: Vec<_> = (0..8)
        .map(|n| {
            let history = Arc::clone(&history);
            tokio::spawn(async move { history.record(user, &format!("tab {n}")).await })
        })
        .collect();
    for writer in writers {
        writer.await.expect("join").expect("record");
    }

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recent_searches WHERE user_id = $1")
        .bind(user)
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(rows, 10);

    let recent = history.recent(user, 10).await.expect("recent");
    assert_eq!(recent.iter().filter(|r| r.query.starts_with("tab ")).count(), 8);
}
