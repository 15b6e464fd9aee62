#![cfg(feature = "web")]

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use expense_survey::SurveyDefinition;
use expense_survey::app::{AppState, router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> axum::Router {
    let state = AppState::new(SurveyDefinition::default()).unwrap();
    router(Arc::new(state))
}

async fn send(app: &axum::Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn visible(state: &Value) -> Vec<String> {
    state["totals"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|t| t["visible"] == json!(true))
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_get_survey() {
    let app = test_app();
    let (status, state) = send(&app, Method::GET, "/api/survey", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["status"], "ok");
    assert_eq!(state["rows"], 1);
    assert_eq!(state["definition"]["title"], "My First Survey");
    assert!(visible(&state).is_empty());
    println!("✓ Survey state includes the definition and hidden totals");
}

#[tokio::test]
async fn test_edit_rows_updates_totals() {
    let app = test_app();

    let (_, state) = send(
        &app,
        Method::POST,
        "/api/cell",
        Some(json!({ "row": 0, "column": "choose_project", "value": 1 })),
    )
    .await;
    assert_eq!(visible(&state), vec!["total_project_1"]);
    assert!(state.get("definition").is_none());

    send(
        &app,
        Method::POST,
        "/api/cell",
        Some(json!({ "row": 0, "column": "amount", "value": "100" })),
    )
    .await;
    let (_, state) = send(&app, Method::POST, "/api/rows", None).await;
    assert_eq!(state["rows"], 2);

    send(
        &app,
        Method::POST,
        "/api/cell",
        Some(json!({ "row": 1, "column": "choose_project", "value": 3 })),
    )
    .await;
    let (_, state) = send(
        &app,
        Method::POST,
        "/api/cell",
        Some(json!({ "row": 1, "column": "amount", "value": 20 })),
    )
    .await;
    assert_eq!(visible(&state), vec!["total_project_1", "total_project_3"]);
    assert_eq!(state["data"]["total_project_1"], 100);
    assert_eq!(state["data"]["total_project_3"], 20);
    println!("✓ Cell edits recompute totals and visibility");

    let (status, state) = send(&app, Method::DELETE, "/api/rows/0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(visible(&state), vec!["total_project_3"]);
    println!("✓ Removing a row hides its project total");
}

#[tokio::test]
async fn test_rejected_edits() {
    let app = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cell",
        Some(json!({ "row": 0, "column": "choose_project", "value": 9 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("choose_project"));

    let (status, _) = send(&app, Method::DELETE, "/api/rows/7", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    println!("✓ Invalid edits answer 400 with a message");
}

#[tokio::test]
async fn test_complete_and_reset() {
    let app = test_app();
    send(
        &app,
        Method::POST,
        "/api/cell",
        Some(json!({ "row": 0, "column": "choose_project", "value": 2 })),
    )
    .await;
    send(
        &app,
        Method::POST,
        "/api/cell",
        Some(json!({ "row": 0, "column": "amount", "value": 30 })),
    )
    .await;

    let (status, body) = send(&app, Method::POST, "/api/complete", None).await;
    assert_eq!(status, StatusCode::OK);
    let results: Value = serde_json::from_str(body["results"].as_str().unwrap()).unwrap();
    assert_eq!(
        results,
        json!({ "projects": [{ "choose_project": 2, "amount": 30 }], "total_project_2": 30 })
    );
    println!("✓ Completion returns the serialized data");

    let (status, _) = send(&app, Method::POST, "/api/rows", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, state) = send(&app, Method::POST, "/api/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["completed"], false);
    assert_eq!(state["data"]["projects"], json!([{}]));
    println!("✓ Reset starts a fresh survey");
}

#[tokio::test]
async fn test_serves_form_page() {
    let app = test_app();
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("/api/survey"));
    assert!(html.contains("alert(state.message)"));
    assert!(html.contains("alert(res.message)"));
    println!("✓ Form page is served at / and surfaces error messages");
}
