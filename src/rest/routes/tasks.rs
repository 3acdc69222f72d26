// rest/routes/tasks.rs — Task resource routes.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

use crate::AppContext;

pub async fn list_tasks(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match ctx.storage.list_tasks().await {
        Ok(tasks) => Ok(Json(json!(tasks))),
        Err(e) => {
            error!(err = %e, "listing tasks failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            ))
        }
    }
}

#[derive(Deserialize)]
struct CreateTaskRequest {
    title: Option<String>,
}

pub async fn create_task(
    State(ctx): State<Arc<AppContext>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    // Validation happens before the gateway is invoked: a missing key, an
    // empty or whitespace-only title, or an unparseable body never contacts
    // the store.
    let title = serde_json::from_slice::<CreateTaskRequest>(&body)
        .ok()
        .and_then(|req| req.title)
        .filter(|t| !t.trim().is_empty());

    let Some(title) = title else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Title is required" })),
        ));
    };

    match ctx.storage.create_task(&title).await {
        Ok(task) => Ok((StatusCode::CREATED, Json(json!(task)))),
        Err(e) => {
            error!(err = %e, "creating task failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            ))
        }
    }
}
