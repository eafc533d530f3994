use api::{CreateTodo, Todo, TodoStats, UpdateTodo};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::Error,
    store::{ListOrder, TodoStore},
};

/// Business logic over the store: input validation, id assignment, toggle
/// semantics, statistics. Holds the store it was constructed with; nothing
/// else touches persistence.
pub struct TodoService {
    store: TodoStore,
}

impl TodoService {
    pub fn new(store: TodoStore) -> Self {
        Self { store }
    }

    /// Creates a todo. The caller may bring an id; otherwise a random UUID is
    /// assigned. Title and description are trimmed, and a blank title is
    /// rejected before anything is persisted.
    pub async fn create(&self, input: CreateTodo) -> Result<Todo, Error> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(Error::EmptyTitle);
        }

        let now = Utc::now();
        let todo = Todo {
            id: input.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: title.to_string(),
            description: input.description.trim().to_string(),
            is_completed: input.is_completed,
            created_at: now,
            updated_at: now,
        };

        self.store.insert(todo.clone()).await?;

        info!(
            id = %todo.id,
            title = %todo.title,
            "created todo"
        );

        Ok(todo)
    }

    pub async fn get(&self, id: &str) -> Result<Todo, Error> {
        self.store
            .get(id)
            .await
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    pub async fn list(&self, order: ListOrder) -> Vec<Todo> {
        self.store.list(order).await
    }

    /// Overwrites title and description. The completion flag changes only
    /// when the input carries one; otherwise the stored value is kept.
    pub async fn update(&self, id: &str, input: UpdateTodo) -> Result<Todo, Error> {
        let mut todo = self.get(id).await?;

        let title = input.title.trim();
        if title.is_empty() {
            return Err(Error::EmptyTitle);
        }

        todo.title = title.to_string();
        todo.description = input.description.trim().to_string();
        if let Some(is_completed) = input.is_completed {
            todo.is_completed = is_completed;
        }
        todo.updated_at = Utc::now();

        self.store.update(todo.clone()).await?;

        info!(
            id = %todo.id,
            title = %todo.title,
            "updated todo"
        );

        Ok(todo)
    }

    /// Flips the completion flag. The returned record carries the resulting
    /// state for the adapters to phrase their messages from.
    pub async fn toggle(&self, id: &str) -> Result<Todo, Error> {
        let mut todo = self.get(id).await?;

        todo.is_completed = !todo.is_completed;
        todo.updated_at = Utc::now();

        self.store.update(todo.clone()).await?;

        info!(
            id = %todo.id,
            is_completed = todo.is_completed,
            "toggled todo"
        );

        Ok(todo)
    }

    /// Removes the record, returning it so the web notice can name its title.
    pub async fn delete(&self, id: &str) -> Result<Todo, Error> {
        let todo = self.store.remove(id).await?;

        info!(
            id = %todo.id,
            title = %todo.title,
            "deleted todo"
        );

        Ok(todo)
    }

    /// Removes every completed todo. Zero removals is a normal outcome.
    pub async fn delete_completed(&self) -> Result<usize, Error> {
        let removed = self.store.remove_where(|todo| todo.is_completed).await?;

        if removed > 0 {
            info!(removed, "deleted completed todos");
        }

        Ok(removed)
    }

    pub async fn stats(&self) -> TodoStats {
        let total = self.store.count(|_| true).await;
        let completed = self.store.count(|todo| todo.is_completed).await;

        let completion_rate = if total > 0 {
            round2(completed as f64 / total as f64 * 100.0)
        } else {
            0.0
        };

        TodoStats {
            total,
            completed,
            pending: total.saturating_sub(completed),
            completion_rate,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
