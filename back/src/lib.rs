use std::sync::Arc;

use axum::Router;
use tera::Tera;

pub mod error;
pub mod rest;
pub mod service;
pub mod store;
pub mod templates;
pub mod web;

use service::TodoService;
use store::TodoStore;

/// Shared router state: the service and the template engine, both constructed
/// once at startup and injected into the handlers.
pub struct AppState {
    pub service: TodoService,
    pub templates: Tera,
}

impl AppState {
    pub fn new(store: TodoStore) -> eyre::Result<Self> {
        Ok(Self {
            service: TodoService::new(store),
            templates: templates::engine()?,
        })
    }
}

/// Assembles the full application: JSON API, web surface, and the envelope
/// 404 fallback for unmatched paths.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(rest::router())
        .merge(web::router())
        .fallback(rest::fallback)
        .with_state(state)
}
