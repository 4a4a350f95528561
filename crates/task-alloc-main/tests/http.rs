// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use task_alloc_main::{
    http::{ASSIGN_ROUTE, HEALTH_ROUTE, router},
    monitor::ResourceMonitor,
    service::AssignmentService,
};
use task_alloc_model::matrix::WorkerPool;
use task_alloc_solver::{params::SearchParameters, solve::AssignmentSolver};
use tower::ServiceExt;

fn app() -> Router {
    let service = AssignmentService::new(
        WorkerPool::new(2).unwrap(),
        AssignmentSolver::new(
            10_000,
            SearchParameters::default()
                .with_time_limit(Duration::from_millis(300))
                .with_iteration_limit(200),
        ),
        ResourceMonitor::disabled(),
    );
    router(Arc::new(service))
}

fn post_json(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(ASSIGN_ROUTE)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri(HEALTH_ROUTE)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_assign_tasks_success() {
    let body = json!({
        "tasks": [
            { "id": 1, "skill": "plumbing", "location": [12.9716, 77.5946], "pincode": 560001, "duration": 30 },
            { "id": 2, "skill": "welding", "location": [12.9720, 77.5950], "pincode": 560001, "duration": 30 }
        ],
        "agents": [
            { "id": 7, "skills": ["plumbing"], "location": [12.9700, 77.5900], "availability": 120, "allowedLocations": [560001] }
        ]
    });
    let response = app().oneshot(post_json(body.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let v = body_json(response).await;
    assert_eq!(v["unassigned_tasks"], json!([2]));
    let routes = v["agent_assignments"].as_array().unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0]["agent_id"], json!(7));
    assert_eq!(routes[0]["tasks"], json!([1]));
    assert!(v["total_distance_covered"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_assign_tasks_validation_error() {
    let body = json!({
        "tasks": [],
        "agents": [
            { "id": 7, "skills": ["plumbing"], "location": [12.97, 77.59], "availability": 120, "allowedLocations": [560001] }
        ]
    });
    let response = app().oneshot(post_json(body.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let v = body_json(response).await;
    assert_eq!(v["error"]["code"], json!("VALIDATION_ERROR"));
    assert!(v["error"]["message"].as_str().is_some());
}

#[tokio::test]
async fn test_assign_tasks_missing_field() {
    let body = json!({
        "tasks": [ { "id": 1, "skill": "plumbing", "pincode": 560001, "duration": 30 } ],
        "agents": [
            { "id": 7, "skills": ["plumbing"], "location": [12.97, 77.59], "availability": 120, "allowedLocations": [560001] }
        ]
    });
    let response = app().oneshot(post_json(body.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let v = body_json(response).await;
    assert_eq!(v["error"]["code"], json!("VALIDATION_ERROR"));
    assert!(v["error"]["message"].as_str().unwrap().contains("location"));
}

#[tokio::test]
async fn test_assign_tasks_malformed_json() {
    let response = app()
        .oneshot(post_json("{ \"tasks\": [".to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let v = body_json(response).await;
    assert_eq!(v["error"]["code"], json!("INVALID_REQUEST_BODY"));
}
