//! The HTTP submission surface fronting the queue: `POST /tasks`
//! enqueues a run, `GET /tasks/:id` polls its status, `GET /metrics`
//! exposes the Prometheus registry.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use uuid::Uuid;
use webqa_engine::metrics;
use webqa_engine::queue::{RunRequest, SubmissionQueue};

#[derive(Clone)]
struct AppState {
    queue: Arc<SubmissionQueue>,
}

#[derive(Serialize)]
struct SubmitResponse {
    task_id: String,
    position: usize,
}

pub fn router(queue: Arc<SubmissionQueue>) -> Router {
    let state = AppState { queue };
    Router::new()
        .route("/tasks", post(submit_task))
        .route("/tasks/:id", get(task_status))
        .route("/metrics", get(metrics_text))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn submit_task(State(state): State<AppState>, Json(request): Json<RunRequest>) -> impl IntoResponse {
    let task_id = Uuid::new_v4().to_string();
    let position = state.queue.add_task(task_id.clone(), request).await;
    Json(SubmitResponse { task_id, position })
}

async fn task_status(State(state): State<AppState>, Path(task_id): Path<String>) -> impl IntoResponse {
    Json(state.queue.get_task_status(&task_id))
}

async fn metrics_text(State(_state): State<AppState>) -> impl IntoResponse {
    match metrics::encode() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}
