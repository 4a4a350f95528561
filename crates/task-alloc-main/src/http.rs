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

use crate::{error::ServiceError, service::AssignmentService};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use task_alloc_model::{req::AssignmentRequest, sol::AssignmentOutcome};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

pub const ASSIGN_ROUTE: &str = "/api/tasks/assign-tasks";
pub const HEALTH_ROUTE: &str = "/health";

pub fn router(service: Arc<AssignmentService>) -> Router {
    Router::new()
        .route(ASSIGN_ROUTE, post(assign_tasks))
        .route(HEALTH_ROUTE, get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[instrument(skip_all)]
async fn assign_tasks(
    State(service): State<Arc<AssignmentService>>,
    body: Result<Json<AssignmentRequest>, JsonRejection>,
) -> Result<Json<AssignmentOutcome>, ServiceError> {
    let Json(request) = body.map_err(|e| ServiceError::InvalidBody(e.body_text()))?;
    info!(
        tasks = request.tasks.as_ref().map_or(0, Vec::len),
        agents = request.agents.as_ref().map_or(0, Vec::len),
        "Received assignment request"
    );

    // The search is CPU bound and may run for the whole time limit.
    let outcome = tokio::task::spawn_blocking(move || service.assign(&request))
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))??;
    Ok(Json(outcome))
}
