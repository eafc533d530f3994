use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single task record. `id` is immutable after creation; `updated_at` is
/// refreshed on every edit or toggle and never precedes `created_at`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/todos`. `title` defaults to empty so a missing field
/// reaches title validation instead of failing deserialization.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub id: Option<String>,
}

/// Body of `PUT /api/todos/{id}`. A `None` completion flag keeps the stored
/// value.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateTodo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub is_completed: Option<bool>,
}

/// Aggregate counts over the whole collection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TodoStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Percentage of completed todos, rounded to two decimals; `0.0` when the
    /// collection is empty.
    pub completion_rate: f64,
}
