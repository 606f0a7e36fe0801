//! HTTP API tests driving the router with `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use research_metrics::client::ScholarlyClient;
use research_metrics::config::Config;
use research_metrics::models::GlobalSouthSeries;
use research_metrics::pipeline::{self, PipelineContext};
use research_metrics::server::routes::create_router_with_sessions;
use research_metrics::session::{SessionManager, Snapshot};

fn build_test_router(base_url: &str, sessions: Arc<SessionManager>) -> axum::Router {
    let client = ScholarlyClient::new(Config::for_testing(base_url)).unwrap();
    let ctx = PipelineContext::new(Arc::new(client));
    create_router_with_sessions(pipeline::register_all_dashboards(), ctx, sessions)
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = build_test_router("http://unused.localhost", Arc::new(SessionManager::new()));

    let response = app.oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "research-metrics");
}

#[tokio::test]
async fn test_list_dashboards() {
    let app = build_test_router("http://unused.localhost", Arc::new(SessionManager::new()));

    let response = app.oneshot(Request::get("/api/dashboards").body(Body::empty()).unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let names: Vec<&str> =
        json["dashboards"].as_array().unwrap().iter().map(|d| d["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["clinical_trials", "global_south", "coauthor_network"]);
}

#[tokio::test]
async fn test_unknown_dashboard() {
    let app = build_test_router("http://unused.localhost", Arc::new(SessionManager::new()));

    let response = app.oneshot(post_json("/api/dashboards/nope", &json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_input_marks_session_failed() {
    let sessions = Arc::new(SessionManager::new());
    let app = build_test_router("http://unused.localhost", Arc::clone(&sessions));

    let response = app
        .clone()
        .oneshot(post_json("/api/dashboards/clinical_trials", &json!({"doi": "   "})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    let session_id = json["sessionId"].as_str().unwrap().to_string();
    assert!(json["error"].as_str().unwrap().contains("doi"));

    let response = app
        .oneshot(Request::get(format!("/api/sessions/{session_id}")).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["status"]["state"], "failed");
    assert!(json["snapshot"].is_null());
    assert_eq!(sessions.session_count().await, 1);
}

#[tokio::test]
async fn test_run_dashboard_publishes_snapshot() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/works"))
        .and(query_param("group_by", "publication_year"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"group_by": []})))
        .mount(&mock_server)
        .await;

    let sessions = Arc::new(SessionManager::new());
    let session = sessions.create_session().await;
    let app = build_test_router(&mock_server.uri(), Arc::clone(&sessions));

    let response = app
        .oneshot(post_json(
            &format!("/api/dashboards/global_south?sessionId={}", session.id),
            &json!({"institutionIds": []}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["sessionId"], session.id.as_str());
    assert_eq!(json["status"]["state"], "done");
    assert_eq!(json["snapshot"]["dashboard"], "global_south");

    assert!(session.snapshot().await.is_some());
}

#[tokio::test]
async fn test_superseded_query_returns_conflict() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"group_by": []}))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&mock_server)
        .await;

    let sessions = Arc::new(SessionManager::new());
    let session = sessions.create_session().await;
    let app = build_test_router(&mock_server.uri(), Arc::clone(&sessions));

    let request = post_json(&format!("/api/dashboards/global_south?sessionId={}", session.id), &json!({}));
    let in_flight = tokio::spawn(app.oneshot(request));

    // The handler takes its ticket before the first upstream request
    while mock_server.received_requests().await.unwrap().is_empty() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let newer = session.begin_query().await;
    let published = session
        .publish(
            newer,
            Snapshot::GlobalSouth(GlobalSouthSeries {
                years: vec![1999],
                institution_ids: Vec::new(),
                global: Vec::new(),
                local: None,
            }),
        )
        .await;
    assert!(published.is_some());

    let response = in_flight.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Superseded by a newer query");
    assert_eq!(json["snapshot"]["years"], json!([1999]));

    let kept = session.snapshot().await.unwrap();
    assert!(matches!(kept.as_ref(), Snapshot::GlobalSouth(s) if s.years == vec![1999]));
}

#[tokio::test]
async fn test_not_found_doi_user_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meta": {}, "results": []})))
        .mount(&mock_server)
        .await;

    let app = build_test_router(&mock_server.uri(), Arc::new(SessionManager::new()));
    let response = app
        .oneshot(post_json("/api/dashboards/clinical_trials", &json!({"doi": "10.1234/missing"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid DOI or no data available");
}

#[tokio::test]
async fn test_suggest_institutions_route() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/autocomplete/institutions"))
        .and(query_param("q", "leiden"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": "https://openalex.org/I121797337", "display_name": "Leiden University"}]
        })))
        .mount(&mock_server)
        .await;

    let app = build_test_router(&mock_server.uri(), Arc::new(SessionManager::new()));
    let response = app
        .oneshot(Request::get("/api/suggest/institutions?q=leiden").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json[0]["display_name"], "Leiden University");
}

#[tokio::test]
async fn test_unknown_session() {
    let app = build_test_router("http://unused.localhost", Arc::new(SessionManager::new()));

    let response =
        app.oneshot(Request::get("/api/sessions/missing").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
