use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{json, Value};

use scrollfeed::{
    domain::{filters::Filters, item::HistoryEntry},
    infrastructure::{resource::Resource, rest::ApiClient, rest::RestFetcher},
    FetchError, IncrementalList, LoadOutcome, PageFetcher,
};

type Seen = Arc<Mutex<Vec<(HashMap<String, String>, Option<String>)>>>;

async fn history(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(String::from);
    let cursor = query.get("cursor").cloned();
    seen.lock().expect("seen").push((query, auth));

    let body = match cursor.as_deref() {
        None => json!({
            "historyList": [
                { "historyId": 1, "action": "LOGIN", "timestamp": "2025-01-01T09:00:00Z" },
                { "historyId": 2, "action": "UPLOAD", "timestamp": "2025-01-01T10:00:00Z" },
            ],
            "pagination": { "last": false },
        }),
        Some(_) => json!({
            "historyList": [
                { "historyId": 2, "action": "UPLOAD", "timestamp": "2025-01-01T10:00:00Z" },
                { "historyId": 3, "action": "DELETE", "timestamp": "2025-01-01T11:00:00Z" },
            ],
            "pagination": { "last": true },
        }),
    };
    Json(json!({ "code": "COMMON200", "message": "OK", "result": body }))
}

async fn history_search(
    State(seen): State<Seen>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    seen.lock().expect("seen").push((query, None));
    Json(json!({
        "code": "COMMON200",
        "message": "OK",
        "result": { "historyList": [], "pagination": { "last": true } },
    }))
}

async fn failing_envelope() -> Json<Value> {
    Json(json!({ "code": "COMMON500", "message": "internal error", "result": null }))
}

async fn unavailable() -> (StatusCode, &'static str) {
    (StatusCode::SERVICE_UNAVAILABLE, "maintenance")
}

async fn serve() -> (String, Seen) {
    let seen = Seen::default();
    let router = Router::new()
        .route("/api/history", get(history))
        .route("/api/history/search", get(history_search))
        .route("/api/faq/categories", get(failing_envelope))
        .route("/api/dictionary/categories", get(unavailable))
        .with_state(Arc::clone(&seen));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    (format!("http://{addr}"), seen)
}

#[tokio::test]
async fn test_pages_through_history() {
    let (base_url, seen) = serve().await;
    let client = ApiClient::new(base_url, Some(SecretString::from("t0ken")));
    let list = IncrementalList::new(RestFetcher::<HistoryEntry>::new(client, Resource::History));

    assert_eq!(list.load_all(None).await.expect("pages"), 2);

    let ids: Vec<String> = list
        .items()
        .into_iter()
        .filter_map(|entry| entry.history_id)
        .collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert!(!list.has_more());

    let seen = seen.lock().expect("seen").clone();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].0.get("cursor"), None);
    assert_eq!(
        seen[1].0.get("cursor").map(String::as_str),
        Some("2025-01-01T19:00:00")
    );
    assert_eq!(seen[0].1.as_deref(), Some("Bearer t0ken"));
}

#[tokio::test]
async fn test_search_mode_forwards_filters() {
    let (base_url, seen) = serve().await;
    let fetcher = RestFetcher::<HistoryEntry>::new(ApiClient::new(base_url, None), Resource::History);
    let filters = Filters::new()
        .with_keyword("  login ")
        .with_department("d-7")
        .with_date_range(
            chrono::NaiveDate::from_ymd_opt(2025, 1, 1),
            chrono::NaiveDate::from_ymd_opt(2025, 1, 31),
        );

    let page = fetcher.fetch(None, &filters).await.expect("page");
    assert!(page.items.is_empty());
    assert!(page.is_last_page);

    let seen = seen.lock().expect("seen").clone();
    let query = &seen[0].0;
    assert_eq!(query.get("keyword").map(String::as_str), Some("login"));
    assert_eq!(query.get("startDate").map(String::as_str), Some("2025-01-01"));
    assert_eq!(query.get("endDate").map(String::as_str), Some("2025-01-31"));
    assert_eq!(query.get("departmentId").map(String::as_str), Some("d-7"));
    assert_eq!(fetcher.scope_for(&filters).as_str(), "history::login");
}

#[tokio::test]
async fn test_failed_envelope_is_an_exhausted_page() {
    let (base_url, _) = serve().await;
    let fetcher =
        RestFetcher::<Value>::new(ApiClient::new(base_url, None), Resource::FaqCategories);

    let page = fetcher.fetch(None, &Filters::new()).await.expect("page");
    assert_eq!(page.code, "COMMON500");
    assert!(page.is_last_page);
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let (base_url, _) = serve().await;
    let fetcher =
        RestFetcher::<Value>::new(ApiClient::new(base_url, None), Resource::DictionaryCategories);
    let list = IncrementalList::new(fetcher);

    match list.load_more().await {
        LoadOutcome::Failed(FetchError::UnexpectedStatus { status, body }) => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert!(list.has_more());
    assert!(list.is_empty());
}
