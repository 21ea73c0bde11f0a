//! Route handlers.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tododb_core::{RepoResult, Todo};

/// A todo as it arrives in a request body.
///
/// Every field is optional on the wire. A missing `id` or `title` becomes
/// an empty string and is rejected by validation; a missing `completed` is
/// false.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoBody {
    /// Identifier. Ignored on `PUT`, where the path wins.
    #[serde(default)]
    pub id: String,
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Completion flag.
    #[serde(default)]
    pub completed: bool,
}

impl TodoBody {
    /// Converts into a todo, replacing the id when `id` is given.
    pub fn into_todo(self, id: Option<String>) -> Todo {
        Todo::new(id.unwrap_or(self.id), self.title).with_completed(self.completed)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageBody {
    message: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthBody {
    status: &'static str,
}

async fn blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> RepoResult<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(result?)
}

fn body(payload: Result<Json<TodoBody>, JsonRejection>) -> ApiResult<TodoBody> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            tracing::debug!(%rejection, "rejected request body");
            Err(ApiError::InvalidBody)
        }
    }
}

pub(crate) async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

pub(crate) async fn list_todos(State(state): State<AppState>) -> ApiResult<Json<Vec<Todo>>> {
    let todos = blocking(move || state.repo.get_all()).await?;
    Ok(Json(todos))
}

pub(crate) async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Todo>> {
    let todo = blocking(move || state.repo.get_by_id(&id)).await?;
    Ok(Json(todo))
}

pub(crate) async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<TodoBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Todo>)> {
    let todo = body(payload)?.into_todo(None);
    let stored = todo.clone();
    blocking(move || state.repo.create(&stored)).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub(crate) async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TodoBody>, JsonRejection>,
) -> ApiResult<Json<Todo>> {
    let todo = body(payload)?.into_todo(Some(id));
    let stored = todo.clone();
    blocking(move || state.repo.update(&stored)).await?;
    Ok(Json(todo))
}

pub(crate) async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageBody>> {
    blocking(move || state.repo.delete(&id)).await?;
    Ok(Json(MessageBody {
        message: "Todo deleted successfully",
    }))
}
