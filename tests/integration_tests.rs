use serde_json::{json, Value};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Helper function to create test app against a mock comparison service
async fn create_test_app(mock_server: &MockServer) -> Router {
    use api_compare_console::handlers::api_router;
    use api_compare_console::handlers::comparison_handlers::AppStateInner;
    use api_compare_console::services::{CompareServiceClient, SessionService};
    use std::sync::Arc;

    let client = Arc::new(CompareServiceClient::new(&mock_server.uri()).unwrap());
    let sessions = Arc::new(SessionService::new(client.clone(), chrono::Duration::minutes(60)));

    api_router(Arc::new(AppStateInner { client, sessions }))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn open_session(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(empty_request("POST", "/console/api/sessions"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["sessionId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server).await;

    let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_new_session_starts_in_live_mode() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server).await;
    let session_id = open_session(&app).await;

    let response = app
        .oneshot(empty_request("GET", &format!("/console/api/sessions/{}", session_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let view = body_json(response).await;
    assert_eq!(view["workflow"]["mode"], "LIVE");
    assert_eq!(view["workflow"]["buttonLabel"], "Run Comparison");
    assert_eq!(view["workflow"]["url1Label"], "Endpoint 1 URL");
    assert_eq!(view["workflow"]["showUrl2"], true);
    assert_eq!(view["run"]["enabled"], true);
    assert_eq!(view["run"]["label"], "Run Comparison");
}

#[tokio::test]
async fn test_closed_session_is_not_found() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server).await;
    let session_id = open_session(&app).await;
    let uri = format!("/console/api/sessions/{}", session_id);

    let response = app.clone().oneshot(empty_request("DELETE", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(empty_request("GET", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error = body_json(response).await;
    assert_eq!(error["status"], 404);
}

#[tokio::test]
async fn test_baseline_compare_cascade() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/baselines/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["Orders"])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/baselines/dates/Orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["2024-03-01"])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server).await;
    let session_id = open_session(&app).await;
    let uri = format!("/console/api/sessions/{}/events", session_id);

    let events = [
        json!({ "type": "modeChanged", "mode": "BASELINE" }),
        json!({ "type": "operationChanged", "operation": "COMPARE" }),
        json!({ "type": "serviceSelected", "service": "Orders" }),
    ];
    let mut view = Value::Null;
    for event in events {
        let response = app.clone().oneshot(json_request("POST", &uri, event)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        view = body_json(response).await;
    }

    assert_eq!(view["buttonLabel"], "Compare with Baseline");
    assert_eq!(view["url1Label"], "API Endpoint URL");
    assert_eq!(view["showUrl2"], false);
    assert_eq!(view["services"]["selected"], "Orders");
    assert_eq!(view["dates"]["enabled"], true);
    assert_eq!(view["dates"]["options"][0]["value"], "2024-03-01");
    assert_eq!(view["runs"]["enabled"], false);
}

#[tokio::test]
async fn test_malformed_event_is_rejected() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server).await;
    let session_id = open_session(&app).await;

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/console/api/sessions/{}/events", session_id),
            json!({ "type": "modeChanged", "mode": "SIDEWAYS" }),
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_run_without_primary_url_prompts() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/compare"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server).await;
    let session_id = open_session(&app).await;

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/console/api/sessions/{}/run", session_id),
            json!({ "url1": "", "url2": "http://b" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let run = body_json(response).await;
    assert_eq!(run["prompt"], "URL 1 is required");
    assert_eq!(run["enabled"], true);
    assert_eq!(run["label"], "Run Comparison");
}

#[tokio::test]
async fn test_run_renders_results() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/compare"))
        .and(body_partial_json(json!({
            "testType": "REST",
            "maxIterations": 100,
            "rest": { "api1": { "baseUrl": "http://a" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "status": "MISMATCH",
                "operationName": "getUser",
                "api1": { "responsePayload": { "id": 1 }, "duration": 10 },
                "api2": { "responsePayload": { "id": 2 }, "duration": 15 },
                "differences": ["id differs"]
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server).await;
    let session_id = open_session(&app).await;

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/console/api/sessions/{}/run", session_id),
            json!({ "url1": "http://a", "url2": "http://b" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let run = body_json(response).await;
    let html = run["resultsHtml"].as_str().unwrap();
    assert!(html.contains("Iteration #1 - getUser"));
    assert!(html.contains("MISMATCH"));
    assert!(html.contains("Total Duration:</strong> 25 ms"));
    assert!(html.contains("id differs"));
    assert_eq!(run["enabled"], true);
}

#[tokio::test]
async fn test_run_on_unknown_session() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/console/api/sessions/missing/run",
            json!({ "url1": "http://a" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_defaults_prefill_form() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "testType": "REST",
            "maxIterations": 7,
            "iterationController": "ONE_BY_ONE",
            "rest": {
                "api1": {
                    "baseUrl": "http://one",
                    "operations": [{ "name": "getUser", "methods": ["GET"] }]
                },
                "api2": { "baseUrl": "http://two" }
            }
        })))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server).await;
    let response = app
        .oneshot(empty_request("GET", "/console/api/defaults"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let ui = body_json(response).await;
    assert_eq!(ui["url1"], "http://one");
    assert_eq!(ui["url2"], "http://two");
    assert_eq!(ui["maxIterations"], "7");
    assert_eq!(ui["operationName"], "getUser");
    assert_eq!(ui["method"], "GET");
}

#[tokio::test]
async fn test_defaults_unavailable_gives_blank_form() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server).await;

    let response = app
        .oneshot(empty_request("GET", "/console/api/defaults"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let ui = body_json(response).await;
    assert_eq!(ui["url1"], "");
}

#[tokio::test]
async fn test_render_empty_results() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server).await;

    let response = app
        .oneshot(json_request("POST", "/console/api/render", json!([])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let rendered = body_json(response).await;
    assert!(rendered["html"].as_str().unwrap().contains("No results returned"));
}

#[tokio::test]
async fn test_report_is_html_document() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/console/api/report",
            json!([{ "status": "ERROR", "operationName": "op", "errorMessage": "<boom>" }]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"].to_str().unwrap().starts_with("text/html"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("&lt;boom&gt;"));
}
