//! Handlers for the `/api/todos` resource.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde_json::Value;
use todo_core::{Envelope, Todo, TodoError, TodoFilter, TodoRepository, TodoStats};

use crate::error::RouteError;

type ApiResult<T> = Result<Json<Envelope<T>>, RouteError>;

/// Routes relative to the `/api/todos` mount point.
pub fn router(repository: TodoRepository) -> Router {
    Router::new()
        .route("/", get(list_todos).post(create_todo))
        .route("/stats", get(todo_stats))
        .route("/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .route("/{id}/toggle", patch(toggle_todo))
        .method_not_allowed_fallback(crate::route_not_found)
        .with_state(repository)
}

#[tracing::instrument(skip_all)]
async fn list_todos(
    State(repository): State<TodoRepository>,
    filter: Result<Query<TodoFilter>, QueryRejection>,
) -> ApiResult<Vec<Todo>> {
    let Query(filter) = filter?;
    let todos = repository.find_all(filter).await?;
    Ok(Json(Envelope::list(todos)))
}

#[tracing::instrument(skip_all)]
async fn todo_stats(State(repository): State<TodoRepository>) -> ApiResult<TodoStats> {
    Ok(Json(Envelope::data(repository.stats().await?)))
}

#[tracing::instrument(skip(repository))]
async fn get_todo(State(repository): State<TodoRepository>, Path(id): Path<String>) -> ApiResult<Todo> {
    let todo = repository.find_by_id(&id).await?.ok_or(TodoError::NotFound)?;
    Ok(Json(Envelope::data(todo)))
}

#[tracing::instrument(skip_all)]
async fn create_todo(
    State(repository): State<TodoRepository>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Todo>>), RouteError> {
    let Json(candidate) = body?;
    let todo = repository.create(&candidate).await?;
    tracing::info!(id = %todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(Envelope::data(todo))))
}

#[tracing::instrument(skip(repository, body))]
async fn update_todo(
    State(repository): State<TodoRepository>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Todo> {
    let Json(candidate) = body?;
    let todo = repository.update(&id, &candidate).await?.ok_or(TodoError::NotFound)?;
    Ok(Json(Envelope::data(todo)))
}

#[tracing::instrument(skip(repository))]
async fn toggle_todo(State(repository): State<TodoRepository>, Path(id): Path<String>) -> ApiResult<Todo> {
    let todo = repository.toggle_complete(&id).await?;
    Ok(Json(Envelope::data(todo)))
}

#[tracing::instrument(skip(repository))]
async fn delete_todo(State(repository): State<TodoRepository>, Path(id): Path<String>) -> ApiResult<()> {
    if !repository.delete(&id).await? {
        return Err(TodoError::NotFound.into());
    }
    Ok(Json(Envelope::message("Todo deleted successfully")))
}
