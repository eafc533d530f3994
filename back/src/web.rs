use std::sync::Arc;

use api::{CreateTodo, UpdateTodo};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use tera::Context;
use tracing::error;

use crate::{error::Error, store::ListOrder, AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route("/api-docs", get(api_docs))
        .route("/web/add", post(add_todo))
        .route("/web/edit/:id", post(edit_todo))
        .route("/web/toggle/:id", post(toggle_todo))
        .route("/web/delete/:id", post(delete_todo))
        .route("/web/delete-completed", post(delete_completed))
}

/// One-shot notice carried across the post-mutation redirect in the query
/// string, rendered once by the listing page.
#[derive(Debug, Deserialize)]
struct NoticeParams {
    notice: Option<String>,
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TodoForm {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

struct PageFailure(tera::Error);

impl From<tera::Error> for PageFailure {
    fn from(err: tera::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for PageFailure {
    fn into_response(self) -> Response {
        error!(error = %self.0, "failed to render page");
        (StatusCode::INTERNAL_SERVER_ERROR, "something went wrong").into_response()
    }
}

async fn home(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NoticeParams>,
) -> Result<Html<String>, PageFailure> {
    let todos = state.service.list(ListOrder::OpenFirst).await;
    let stats = state.service.stats().await;

    let mut context = Context::new();
    context.insert("todos", &todos);
    context.insert("stats", &stats);
    context.insert("notice", &params.notice);
    context.insert("notice_kind", params.kind.as_deref().unwrap_or("success"));

    let page = state.templates.render("home.html", &context)?;
    Ok(Html(page))
}

async fn api_docs(State(state): State<Arc<AppState>>) -> Result<Html<String>, PageFailure> {
    let page = state.templates.render("docs.html", &Context::new())?;
    Ok(Html(page))
}

fn notify(message: &str, kind: &str) -> Redirect {
    let encoded = utf8_percent_encode(message, NON_ALPHANUMERIC);
    Redirect::to(&format!("/?notice={encoded}&kind={kind}"))
}

fn notify_ok(message: &str) -> Redirect {
    notify(message, "success")
}

fn notify_err(message: &str) -> Redirect {
    notify(message, "error")
}

fn failure_notice(err: Error) -> Redirect {
    match &err {
        Error::EmptyTitle | Error::DuplicateId(_) | Error::NotFound(_) => {
            notify_err(&err.to_string())
        }
        Error::Persist(source) => {
            error!(%source, "failed to persist todos");
            notify_err("something went wrong")
        }
    }
}

async fn add_todo(State(state): State<Arc<AppState>>, Form(form): Form<TodoForm>) -> Redirect {
    let input = CreateTodo {
        title: form.title,
        description: form.description,
        ..Default::default()
    };

    match state.service.create(input).await {
        Ok(todo) => notify_ok(&format!("added \"{}\"", todo.title)),
        Err(err) => failure_notice(err),
    }
}

async fn edit_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(form): Form<TodoForm>,
) -> Redirect {
    let input = UpdateTodo {
        title: form.title,
        description: form.description,
        is_completed: None,
    };

    match state.service.update(&id, input).await {
        Ok(todo) => notify_ok(&format!("updated \"{}\"", todo.title)),
        Err(err) => failure_notice(err),
    }
}

async fn toggle_todo(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Redirect {
    match state.service.toggle(&id).await {
        Ok(todo) => {
            let status = if todo.is_completed { "done" } else { "not done" };
            notify_ok(&format!("marked \"{}\" as {status}", todo.title))
        }
        Err(err) => failure_notice(err),
    }
}

async fn delete_todo(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Redirect {
    match state.service.delete(&id).await {
        Ok(todo) => notify_ok(&format!("deleted \"{}\"", todo.title)),
        Err(err) => failure_notice(err),
    }
}

async fn delete_completed(State(state): State<Arc<AppState>>) -> Redirect {
    match state.service.delete_completed().await {
        Ok(0) => notify_err("no completed todos to delete"),
        Ok(removed) => notify_ok(&format!("deleted {removed} completed todos")),
        Err(err) => failure_notice(err),
    }
}
