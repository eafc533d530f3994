use std::sync::Arc;

use api::{CreateTodo, Envelope, Todo, TodoStats, UpdateTodo};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch},
    Json, Router,
};
use serde_json::json;
use tracing::error;

use crate::{error::Error, store::ListOrder, AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api", get(index))
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/stats", get(todo_stats))
        .route("/api/todos/completed", delete(delete_completed_todos))
        .route(
            "/api/todos/:id",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/api/todos/:id/toggle", patch(toggle_todo))
}

/// Envelope 404 for unmatched paths, registered as the router fallback.
pub async fn fallback() -> (StatusCode, Json<Envelope<()>>) {
    (
        StatusCode::NOT_FOUND,
        Json(Envelope::fail("unknown endpoint")),
    )
}

/// Service failure mapped onto the envelope contract. Validation and conflict
/// answer 400, missing records 404. Persistence failures answer 500 with a
/// fixed message; the source error goes to the log, not the client.
pub struct ApiFailure(Error);

impl From<Error> for ApiFailure {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::EmptyTitle | Error::DuplicateId(_) => {
                (StatusCode::BAD_REQUEST, self.0.to_string())
            }
            Error::NotFound(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            Error::Persist(source) => {
                error!(%source, "failed to persist todos");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "something went wrong".to_string(),
                )
            }
        };

        (status, Json(Envelope::<()>::fail(message))).into_response()
    }
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Todo List API",
        "version": "1.0.0",
        "web_interface": "/",
        "api_docs": "/api-docs",
        "endpoints": {
            "GET /api/todos": "list all todos",
            "GET /api/todos/{id}": "fetch a todo by id",
            "POST /api/todos": "create a todo",
            "PUT /api/todos/{id}": "update a todo",
            "PATCH /api/todos/{id}/toggle": "toggle completion",
            "DELETE /api/todos/{id}": "delete a todo",
            "GET /api/todos/stats": "aggregate statistics",
            "DELETE /api/todos/completed": "delete all completed todos",
        },
    }))
}

async fn list_todos(State(state): State<Arc<AppState>>) -> Json<Envelope<Vec<Todo>>> {
    let todos = state.service.list(ListOrder::CreatedDesc).await;
    Json(Envelope::ok(todos, "todos fetched"))
}

async fn get_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Todo>>, ApiFailure> {
    let todo = state.service.get(&id).await?;
    Ok(Json(Envelope::ok(todo, "todo fetched")))
}

async fn create_todo(
    State(state): State<Arc<AppState>>,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Envelope<Todo>>), ApiFailure> {
    let todo = state.service.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(todo, "todo created")),
    ))
}

async fn update_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Envelope<Todo>>, ApiFailure> {
    let todo = state.service.update(&id, input).await?;
    Ok(Json(Envelope::ok(todo, "todo updated")))
}

async fn toggle_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Todo>>, ApiFailure> {
    let todo = state.service.toggle(&id).await?;

    let message = if todo.is_completed {
        "todo marked as done"
    } else {
        "todo marked as not done"
    };

    Ok(Json(Envelope::ok(todo, message)))
}

async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<()>>, ApiFailure> {
    state.service.delete(&id).await?;
    Ok(Json(Envelope::accepted("todo deleted")))
}

async fn todo_stats(State(state): State<Arc<AppState>>) -> Json<Envelope<TodoStats>> {
    let stats = state.service.stats().await;
    Json(Envelope::ok(stats, "stats fetched"))
}

async fn delete_completed_todos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<()>>, ApiFailure> {
    let removed = state.service.delete_completed().await?;

    let message = if removed == 0 {
        "no completed todos to delete".to_string()
    } else {
        format!("deleted {removed} completed todos")
    };

    Ok(Json(Envelope::accepted(message)))
}
