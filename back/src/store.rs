use std::{collections::HashMap, fs, io, path::PathBuf};

use api::Todo;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::{Error, PersistError};

/// Listing order, chosen by the caller per view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListOrder {
    /// Newest first, by creation time.
    #[default]
    CreatedDesc,
    /// Incomplete todos first, newest first within each group.
    OpenFirst,
}

/// Owns the persisted todo collection, keyed by id. The collection lives in
/// memory behind a mutex and is snapshotted to a RON file; every mutating
/// call writes the snapshot before returning and rolls the in-memory change
/// back if the write fails.
#[derive(Debug)]
pub struct TodoStore {
    path: PathBuf,
    todos: Mutex<HashMap<String, Todo>>,
}

impl TodoStore {
    /// Opens the store backed by `path`, loading an existing snapshot. A
    /// missing file is an empty store, not an error.
    pub fn open(path: impl Into<PathBuf>) -> eyre::Result<Self> {
        let path = path.into();

        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Self {
                    path,
                    todos: Mutex::default(),
                });
            }
            Err(err) => eyre::bail!(err),
        };
        let data: DataOwned = ron::de::from_reader(file)?;

        match data {
            DataOwned::V1 { todos } => Ok(Self {
                path,
                todos: Mutex::new(todos),
            }),
        }
    }

    fn flush(&self, todos: &HashMap<String, Todo>) -> Result<(), PersistError> {
        let data = DataBorrowed::V1 { todos };

        let file = fs::File::create(&self.path)?;
        let mut ser = ron::Serializer::new(file, Some(Default::default()))?;
        data.serialize(&mut ser)?;

        Ok(())
    }

    /// Persists a new record. Fails if a record with the same id exists.
    pub async fn insert(&self, todo: Todo) -> Result<(), Error> {
        let mut todos = self.todos.lock().await;

        if todos.contains_key(&todo.id) {
            return Err(Error::DuplicateId(todo.id));
        }

        let id = todo.id.clone();
        todos.insert(id.clone(), todo);

        if let Err(err) = self.flush(&todos) {
            todos.remove(&id);
            return Err(err.into());
        }

        Ok(())
    }

    pub async fn get(&self, id: &str) -> Option<Todo> {
        self.todos.lock().await.get(id).cloned()
    }

    pub async fn list(&self, order: ListOrder) -> Vec<Todo> {
        let todos = self.todos.lock().await;
        let mut todos: Vec<_> = todos.values().cloned().collect();

        match order {
            ListOrder::CreatedDesc => {
                todos.sort_unstable_by(|a, b| a.created_at.cmp(&b.created_at).reverse());
            }
            ListOrder::OpenFirst => {
                todos.sort_unstable_by(|a, b| {
                    (a.is_completed.cmp(&b.is_completed))
                        .then(a.created_at.cmp(&b.created_at).reverse())
                });
            }
        }

        todos
    }

    /// Replaces the stored record with the same id.
    pub async fn update(&self, todo: Todo) -> Result<(), Error> {
        let mut todos = self.todos.lock().await;

        let id = todo.id.clone();
        let Some(previous) = todos.insert(id.clone(), todo) else {
            todos.remove(&id);
            return Err(Error::NotFound(id));
        };

        if let Err(err) = self.flush(&todos) {
            todos.insert(id, previous);
            return Err(err.into());
        }

        Ok(())
    }

    /// Removes and returns the record with `id`.
    pub async fn remove(&self, id: &str) -> Result<Todo, Error> {
        let mut todos = self.todos.lock().await;

        let Some(todo) = todos.remove(id) else {
            return Err(Error::NotFound(id.to_string()));
        };

        if let Err(err) = self.flush(&todos) {
            todos.insert(todo.id.clone(), todo);
            return Err(err.into());
        }

        Ok(todo)
    }

    /// Removes every record matching `predicate`, returning how many were
    /// removed. Removing none is success.
    pub async fn remove_where(
        &self,
        predicate: impl Fn(&Todo) -> bool,
    ) -> Result<usize, Error> {
        let mut todos = self.todos.lock().await;

        let removed: Vec<Todo> = todos
            .values()
            .filter(|todo| predicate(todo))
            .cloned()
            .collect();

        if removed.is_empty() {
            return Ok(0);
        }

        for todo in &removed {
            todos.remove(&todo.id);
        }

        if let Err(err) = self.flush(&todos) {
            for todo in removed {
                todos.insert(todo.id.clone(), todo);
            }
            return Err(err.into());
        }

        Ok(removed.len())
    }

    pub async fn count(&self, predicate: impl Fn(&Todo) -> bool) -> usize {
        let todos = self.todos.lock().await;
        todos.values().filter(|todo| predicate(todo)).count()
    }
}

#[derive(Serialize)]
enum DataBorrowed<'a> {
    V1 { todos: &'a HashMap<String, Todo> },
}

#[derive(Deserialize)]
enum DataOwned {
    V1 { todos: HashMap<String, Todo> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn todo(id: &str, completed: bool, age_secs: i64) -> Todo {
        let created = Utc::now() - Duration::seconds(age_secs);
        Todo {
            id: id.to_string(),
            title: format!("todo {id}"),
            description: String::new(),
            is_completed: completed,
            created_at: created,
            updated_at: created,
        }
    }

    fn open(dir: &TempDir) -> TodoStore {
        TodoStore::open(dir.path().join("todos.ron")).unwrap()
    }

    #[tokio::test]
    async fn insert_then_get() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        store.insert(todo("a", false, 0)).await.unwrap();

        let found = store.get("a").await.unwrap();
        assert_eq!(found.title, "todo a");
        assert!(store.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_id() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        let mut first = todo("a", false, 0);
        first.title = "original".to_string();
        store.insert(first).await.unwrap();

        let err = store.insert(todo("a", true, 0)).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateId(id) if id == "a"));

        // the stored record is untouched
        assert_eq!(store.get("a").await.unwrap().title, "original");
    }

    #[tokio::test]
    async fn list_newest_first() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        store.insert(todo("old", false, 60)).await.unwrap();
        store.insert(todo("new", false, 0)).await.unwrap();
        store.insert(todo("mid", false, 30)).await.unwrap();

        let ids: Vec<_> = store
            .list(ListOrder::CreatedDesc)
            .await
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, ["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn list_open_first_groups_by_completion() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        store.insert(todo("done-new", true, 0)).await.unwrap();
        store.insert(todo("open-old", false, 60)).await.unwrap();
        store.insert(todo("open-new", false, 10)).await.unwrap();
        store.insert(todo("done-old", true, 90)).await.unwrap();

        let ids: Vec<_> = store
            .list(ListOrder::OpenFirst)
            .await
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, ["open-new", "open-old", "done-new", "done-old"]);
    }

    #[tokio::test]
    async fn update_replaces_matching_record() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        store.insert(todo("a", false, 0)).await.unwrap();

        let mut edited = store.get("a").await.unwrap();
        edited.title = "edited".to_string();
        store.update(edited).await.unwrap();

        assert_eq!(store.get("a").await.unwrap().title, "edited");
    }

    #[tokio::test]
    async fn update_missing_record_fails() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        let err = store.update(todo("ghost", false, 0)).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(id) if id == "ghost"));
        assert_eq!(store.count(|_| true).await, 0);
    }

    #[tokio::test]
    async fn remove_returns_the_record() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        store.insert(todo("a", false, 0)).await.unwrap();

        let removed = store.remove("a").await.unwrap();
        assert_eq!(removed.id, "a");
        assert!(store.get("a").await.is_none());

        let err = store.remove("a").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn remove_where_takes_only_matches() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        store.insert(todo("a", true, 0)).await.unwrap();
        store.insert(todo("b", false, 10)).await.unwrap();
        store.insert(todo("c", true, 20)).await.unwrap();

        let removed = store.remove_where(|t| t.is_completed).await.unwrap();
        assert_eq!(removed, 2);
        assert!(store.get("b").await.is_some());

        // nothing left to match; still success
        let removed = store.remove_where(|t| t.is_completed).await.unwrap();
        assert_eq!(removed, 0);
    }

    #[tokio::test]
    async fn count_with_predicate() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        store.insert(todo("a", true, 0)).await.unwrap();
        store.insert(todo("b", false, 10)).await.unwrap();

        assert_eq!(store.count(|_| true).await, 2);
        assert_eq!(store.count(|t| t.is_completed).await, 1);
    }

    #[tokio::test]
    async fn snapshot_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todos.ron");

        let store = TodoStore::open(&path).unwrap();
        store.insert(todo("a", true, 0)).await.unwrap();
        store.insert(todo("b", false, 10)).await.unwrap();
        drop(store);

        let reopened = TodoStore::open(&path).unwrap();
        assert_eq!(reopened.count(|_| true).await, 2);
        assert!(reopened.get("a").await.unwrap().is_completed);
    }
}
