//! HttpClient and SearchController against an in-process archive server

use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rnd_archive::{
    ArchiveError, ControllerConfig, HttpClient, HttpClientConfig, NotificationCenter,
    RequestOptions, SearchController, SearchEvent, SearchQuery, Severity, SortKey,
};

const TOTAL_CHARTS: u64 = 120;

#[derive(Clone, Default)]
struct Recorded {
    requests: Arc<Mutex<Vec<(HeaderMap, String)>>>,
}

impl Recorded {
    fn last(&self) -> (HeaderMap, String) {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

fn param(query: &str, name: &str) -> Option<u64> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| value.parse().ok())
}

async fn search(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Json<Value> {
    let query = query.unwrap_or_default();
    recorded.requests.lock().unwrap().push((headers, query.clone()));

    let offset = param(&query, "offset").unwrap_or(0);
    let limit = param(&query, "limit").unwrap_or(100);
    let end = (offset + limit).min(TOTAL_CHARTS);
    let results: Vec<Value> = (offset..end)
        .map(|n| {
            json!({
                "chart_id": format!("c{}", n),
                "title": format!("Chart {}", n),
                "description": null,
                "tags": ["Politik"],
                "thumbnail": null,
                "published_date": "2024-03-05T14:07:00+00:00",
                "is_published": true,
                "is_archived": n % 2 == 0
            })
        })
        .collect();

    Json(json!({
        "results": results,
        "total_count": TOTAL_CHARTS,
        "limit": limit,
        "offset": offset
    }))
}

async fn echo(headers: HeaderMap, body: String) -> Json<Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    Json(json!({
        "body": body,
        "requested_with": header("x-requested-with"),
        "csrf": header("x-csrftoken"),
    }))
}

async fn spawn_server(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> (HttpClient, Arc<NotificationCenter>) {
    let notifications = Arc::new(NotificationCenter::default());
    let config = HttpClientConfig::new(format!("http://{}", addr))
        .with_csrf_token("tok123")
        .with_session_id("sess456");
    let client = HttpClient::new(config, notifications.clone()).unwrap();
    (client, notifications)
}

fn archive_app(recorded: Recorded) -> Router {
    Router::new()
        .route("/api/v1/charts/search/", get(search))
        .route("/api/v1/charts/echo/", post(echo))
        .with_state(recorded)
}

#[tokio::test]
async fn test_search_sends_csrf_token_and_repeated_tags() {
    let recorded = Recorded::default();
    let addr = spawn_server(archive_app(recorded.clone())).await;
    let (client, notifications) = client_for(addr);

    let query = SearchQuery {
        q: "wahl".to_string(),
        tags: vec!["Politik".to_string(), "Karte".to_string()],
        limit: 2,
        offset: 4,
        sort: SortKey::PublishedDateDesc,
    };
    let page = client.search(&query).await.unwrap();

    assert_eq!(page.total_count, TOTAL_CHARTS);
    assert_eq!(page.results.len(), 2);
    assert_eq!(page.results[0].id, "c4");
    assert!(page.results[0].is_archived);

    let (headers, raw_query) = recorded.last();
    assert_eq!(headers.get("x-csrftoken").unwrap(), "tok123");
    assert_eq!(headers.get("content-type").unwrap(), "application/json");
    let cookie = headers.get("cookie").unwrap().to_str().unwrap();
    assert!(cookie.contains("csrftoken=tok123"));
    assert!(cookie.contains("sessionid=sess456"));

    assert!(raw_query.contains("q=wahl"));
    assert!(raw_query.contains("tags=Politik&tags=Karte"));
    assert!(raw_query.contains("limit=2"));
    assert!(raw_query.contains("offset=4"));
    assert!(raw_query.contains("sort=-published_date"));

    assert!(notifications.visible().is_empty());
}

#[tokio::test]
async fn test_request_merges_caller_options() {
    let addr = spawn_server(archive_app(Recorded::default())).await;
    let (client, _) = client_for(addr);

    let value = client
        .request(
            "/charts/echo/",
            RequestOptions::post(json!({"tag": "Karte"})).with_header("X-Requested-With", "rnd"),
        )
        .await
        .unwrap();

    assert_eq!(value["body"], "{\"tag\":\"Karte\"}");
    assert_eq!(value["requested_with"], "rnd");
    assert_eq!(value["csrf"], "tok123");
}

#[tokio::test]
async fn test_non_success_status_maps_to_http_error() {
    let app = Router::new().route(
        "/api/v1/charts/search/",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "{\"error\": \"db down\"}") }),
    );
    let addr = spawn_server(app).await;
    let (client, notifications) = client_for(addr);

    let err = client
        .search(&rnd_archive::SearchState::default().to_query())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    let toasts = notifications.visible();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].severity, Severity::Danger);
    assert_eq!(toasts[0].text, "API request failed");
}

#[tokio::test]
async fn test_invalid_json_maps_to_decode_error() {
    let app = Router::new().route("/api/v1/charts/search/", get(|| async { "<html>login</html>" }));
    let addr = spawn_server(app).await;
    let (client, notifications) = client_for(addr);

    let err = client
        .search(&rnd_archive::SearchState::default().to_query())
        .await
        .unwrap_err();

    assert!(matches!(err, ArchiveError::Decode(_)));
    assert_eq!(notifications.visible().len(), 1);
}

#[tokio::test]
async fn test_unreachable_server_maps_to_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (client, notifications) = client_for(addr);
    let err = client
        .request("/charts/search/", RequestOptions::get())
        .await
        .unwrap_err();

    assert!(matches!(err, ArchiveError::Transport(_)));
    assert_eq!(notifications.visible().len(), 1);
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let app = Router::new().route(
        "/api/v1/charts/search/",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            "{}"
        }),
    );
    let addr = spawn_server(app).await;
    let notifications = Arc::new(NotificationCenter::default());
    let config = HttpClientConfig::new(format!("http://{}", addr))
        .with_timeout(Duration::from_millis(100));
    let client = HttpClient::new(config, notifications).unwrap();

    let err = client
        .request("/charts/search/", RequestOptions::get())
        .await
        .unwrap_err();

    assert!(matches!(err, ArchiveError::Transport(_)));
}

#[tokio::test]
async fn test_controller_pages_through_server_results() {
    let recorded = Recorded::default();
    let addr = spawn_server(archive_app(recorded.clone())).await;
    let (client, notifications) = client_for(addr);

    let handle = SearchController::new(
        Arc::new(client),
        notifications.clone(),
        ControllerConfig {
            page_size: 50,
            search_delay: Duration::from_millis(10),
        },
    )
    .spawn();
    let mut view = handle.view();

    handle.send(SearchEvent::QueryInput("sales".into())).await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), view.wait_for(|v| v.card_count() == 50))
        .await
        .unwrap()
        .unwrap();
    assert!(handle.current_view().load_more_visible);

    handle.send(SearchEvent::LoadMore).await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), view.wait_for(|v| v.card_count() == 100))
        .await
        .unwrap()
        .unwrap();

    let current = handle.current_view();
    assert!(current.load_more_visible);
    assert_eq!(current.result_count_label.as_deref(), Some("120 charts found"));
    assert!(recorded.last().1.contains("offset=50"));
    assert!(notifications.visible().is_empty());

    let controller = handle.shutdown().await.unwrap();
    assert_eq!(controller.state().page_index, 2);
}
