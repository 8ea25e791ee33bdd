//! Document store seam and the in-process implementation.
//!
//! # Design
//! `TodoStore` covers the single-document operations the repository needs;
//! each call is atomic on its own and no call spans more than one record.
//! Validation never happens here: stores receive `NewTodo` / `TodoPatch`
//! values that already passed the schema.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::TodoError;
use crate::types::{NewTodo, Priority, Todo, TodoFilter, TodoId, TodoPatch, TodoStats};

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Insert a record, assigning it a fresh id.
    async fn insert(&self, todo: NewTodo) -> Result<Todo, TodoError>;

    /// All records matching `filter`, newest `created_at` first.
    async fn find(&self, filter: TodoFilter) -> Result<Vec<Todo>, TodoError>;

    async fn find_one(&self, id: TodoId) -> Result<Option<Todo>, TodoError>;

    /// Apply `patch` to the record and return it as stored afterwards, or
    /// `None` if no record has that id.
    async fn merge(&self, id: TodoId, patch: TodoPatch) -> Result<Option<Todo>, TodoError>;

    /// Returns whether a record was removed.
    async fn remove(&self, id: TodoId) -> Result<bool, TodoError>;

    async fn stats(&self) -> Result<TodoStats, TodoError>;
}

/// `TodoStore` backed by a map behind an async lock.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    todos: Arc<RwLock<HashMap<TodoId, Todo>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn insert(&self, todo: NewTodo) -> Result<Todo, TodoError> {
        let todo = todo.into_todo(TodoId::new());
        self.todos.write().await.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn find(&self, filter: TodoFilter) -> Result<Vec<Todo>, TodoError> {
        let todos = self.todos.read().await;
        let mut found: Vec<Todo> = todos.values().filter(|todo| filter.matches(todo)).cloned().collect();
        found.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(found)
    }

    async fn find_one(&self, id: TodoId) -> Result<Option<Todo>, TodoError> {
        Ok(self.todos.read().await.get(&id).cloned())
    }

    async fn merge(&self, id: TodoId, patch: TodoPatch) -> Result<Option<Todo>, TodoError> {
        let mut todos = self.todos.write().await;
        Ok(todos.get_mut(&id).map(|todo| {
            patch.apply(todo);
            todo.clone()
        }))
    }

    async fn remove(&self, id: TodoId) -> Result<bool, TodoError> {
        Ok(self.todos.write().await.remove(&id).is_some())
    }

    async fn stats(&self) -> Result<TodoStats, TodoError> {
        let todos = self.todos.read().await;
        let total = todos.len() as u64;
        let completed = todos.values().filter(|todo| todo.completed).count() as u64;
        let high_priority = todos.values().filter(|todo| todo.priority == Priority::High).count() as u64;
        Ok(TodoStats {
            total,
            completed,
            pending: total - completed,
            high_priority,
        })
    }
}
