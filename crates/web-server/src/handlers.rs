use crate::{
    AppState,
    error::AppError,
    extract::{JsonOrForm, TodoId},
};
use axum::{Json, extract::State, http::StatusCode};
use chrono::{SecondsFormat, Utc};
use core_types::{NewTodo, Todo, TodoUpdate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of `POST /api/todos`. The title is optional here so that a missing
/// title is reported as a validation error rather than a decoding error.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

/// # POST /api/todos
pub async fn create_todo(
    State(state): State<Arc<AppState>>,
    JsonOrForm(body): JsonOrForm<CreateTodoRequest>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let new_todo = NewTodo::from_input(body.title, body.description)?;
    let todo = state
        .todos
        .create(new_todo)
        .await
        .map_err(AppError::database("Failed to create todo"))?;

    tracing::info!(id = todo.id, "Created todo.");
    Ok((StatusCode::CREATED, Json(todo)))
}

/// # GET /api/todos
/// Newest first.
pub async fn list_todos(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Todo>>, AppError> {
    let todos = state
        .todos
        .find_all()
        .await
        .map_err(AppError::database("Failed to fetch todos"))?;
    Ok(Json(todos))
}

/// # GET /api/todos/:id
pub async fn get_todo(
    TodoId(id): TodoId,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Todo>, AppError> {
    let todo = state
        .todos
        .find_by_id(id)
        .await
        .map_err(AppError::database("Failed to fetch todo"))?
        .ok_or_else(AppError::todo_not_found)?;
    Ok(Json(todo))
}

/// # PUT /api/todos/:id
/// Only the supplied fields change. An empty body returns the todo as it is.
pub async fn update_todo(
    TodoId(id): TodoId,
    State(state): State<Arc<AppState>>,
    JsonOrForm(update): JsonOrForm<TodoUpdate>,
) -> Result<Json<Todo>, AppError> {
    update.validate()?;

    let todo = state
        .todos
        .update(id, update)
        .await
        .map_err(AppError::database("Failed to update todo"))?
        .ok_or_else(AppError::todo_not_found)?;

    tracing::info!(id, "Updated todo.");
    Ok(Json(todo))
}

/// # DELETE /api/todos/:id
pub async fn delete_todo(
    TodoId(id): TodoId,
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, AppError> {
    let deleted = state
        .todos
        .delete(id)
        .await
        .map_err(AppError::database("Failed to delete todo"))?;

    if !deleted {
        return Err(AppError::todo_not_found());
    }

    tracing::info!(id, "Deleted todo.");
    Ok(Json(MessageResponse {
        message: "Todo deleted successfully",
    }))
}

/// # GET /api/health
/// Never touches the database.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
