//! Todo operations over a `TodoStore`.
//!
//! # Design
//! `TodoRepository` holds no records of its own: it parses ids, runs the
//! schema rules, stamps times from its `Clock` and hands the result to the
//! store. Lookups, updates and deletes report a missing record as `None` /
//! `false`; only `toggle_complete` turns it into `TodoError::NotFound`.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::clock::Clock;
use crate::error::TodoError;
use crate::store::TodoStore;
use crate::types::{Todo, TodoFilter, TodoId, TodoStats};
use crate::validate::{validate_create, validate_update};

#[derive(Clone)]
pub struct TodoRepository {
    store: Arc<dyn TodoStore>,
    clock: Arc<dyn Clock>,
}

impl TodoRepository {
    pub fn new(store: Arc<dyn TodoStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    #[tracing::instrument(skip_all)]
    pub async fn create(&self, candidate: &Value) -> Result<Todo, TodoError> {
        let todo = validate_create(candidate, self.clock.now())?;
        let todo = self.store.insert(todo).await?;
        tracing::debug!(id = %todo.id, "created todo");
        Ok(todo)
    }

    #[tracing::instrument(skip(self))]
    pub async fn find_all(&self, filter: TodoFilter) -> Result<Vec<Todo>, TodoError> {
        self.store.find(filter).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Todo>, TodoError> {
        let id = TodoId::parse(id)?;
        self.store.find_one(id).await
    }

    /// Merge the fields present in `candidate` onto the stored record.
    #[tracing::instrument(skip(self, candidate))]
    pub async fn update(&self, id: &str, candidate: &Value) -> Result<Option<Todo>, TodoError> {
        let id = TodoId::parse(id)?;
        self.merge(id, candidate).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<bool, TodoError> {
        let id = TodoId::parse(id)?;
        let removed = self.store.remove(id).await?;
        if removed {
            tracing::debug!(%id, "deleted todo");
        }
        Ok(removed)
    }

    /// Flip `completed` through the same merge path as `update`.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_complete(&self, id: &str) -> Result<Todo, TodoError> {
        let id = TodoId::parse(id)?;
        let current = self.store.find_one(id).await?.ok_or(TodoError::NotFound)?;
        // the record can vanish between the read and the write
        self.merge(id, &json!({ "completed": !current.completed }))
            .await?
            .ok_or(TodoError::NotFound)
    }

    #[tracing::instrument(skip(self))]
    pub async fn stats(&self) -> Result<TodoStats, TodoError> {
        self.store.stats().await
    }

    async fn merge(&self, id: TodoId, candidate: &Value) -> Result<Option<Todo>, TodoError> {
        let patch = validate_update(candidate, self.clock.now())?;
        self.store.merge(id, patch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, SystemClock};
    use crate::store::MemoryStore;
    use crate::types::Priority;
    use chrono::{Duration, TimeZone, Utc};

    fn repository() -> TodoRepository {
        TodoRepository::new(Arc::new(MemoryStore::new()), Arc::new(SystemClock::default()))
    }

    const MISSING_ID: &str = "65f1a2b3c4d5e6f708192a3b";

    #[tokio::test]
    async fn create_applies_defaults_and_equal_timestamps() {
        let todo = repository().create(&json!({"title": "Buy milk"})).await.unwrap();
        assert!(!todo.completed);
        assert_eq!(todo.priority, Priority::Medium);
        assert_eq!(todo.created_at, todo.updated_at);
    }

    #[tokio::test]
    async fn create_uses_clock_time() {
        let start = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
        let repo = TodoRepository::new(Arc::new(MemoryStore::new()), Arc::new(FixedClock::new(start)));
        let todo = repo.create(&json!({"title": "Leap"})).await.unwrap();
        assert_eq!(todo.created_at, start);
    }

    #[tokio::test]
    async fn create_rejects_invalid_candidate() {
        let err = repository().create(&json!({"title": ""})).await.unwrap_err();
        assert!(matches!(err, TodoError::Validation(_)));
        assert!(err.to_string().contains("Title is required"));
    }

    #[tokio::test]
    async fn update_leaves_omitted_fields_unchanged() {
        let repo = repository();
        let created = repo
            .create(&json!({
                "title": "Plan trip",
                "description": "book flights",
                "priority": "high",
                "dueDate": "2024-09-01T00:00:00Z",
            }))
            .await
            .unwrap();

        let updated = repo
            .update(&created.id.to_string(), &json!({"completed": true}))
            .await
            .unwrap()
            .unwrap();

        assert!(updated.completed);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.priority, created.priority);
        assert_eq!(updated.due_date, created.due_date);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn update_missing_record_is_none() {
        let result = repository().update(MISSING_ID, &json!({"title": "x"})).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn update_checks_id_before_fields() {
        let err = repository().update("nope", &json!({"title": ""})).await.unwrap_err();
        assert!(matches!(err, TodoError::InvalidId));
    }

    #[tokio::test]
    async fn update_rejects_invalid_fields() {
        let repo = repository();
        let created = repo.create(&json!({"title": "Stay"})).await.unwrap();
        let err = repo
            .update(&created.id.to_string(), &json!({"priority": "urgent"}))
            .await
            .unwrap_err();
        assert!(matches!(err, TodoError::Validation(_)));

        let stored = repo.find_by_id(&created.id.to_string()).await.unwrap().unwrap();
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn toggle_twice_restores_completion() {
        let repo = repository();
        let created = repo.create(&json!({"title": "Flip"})).await.unwrap();
        let id = created.id.to_string();

        let once = repo.toggle_complete(&id).await.unwrap();
        assert!(once.completed);
        assert!(once.updated_at > created.updated_at);

        let twice = repo.toggle_complete(&id).await.unwrap();
        assert!(!twice.completed);
        assert!(twice.updated_at > once.updated_at);
    }

    #[tokio::test]
    async fn toggle_missing_record_is_not_found() {
        let err = repository().toggle_complete(MISSING_ID).await.unwrap_err();
        assert!(matches!(err, TodoError::NotFound));
    }

    #[tokio::test]
    async fn find_all_filters_and_orders() {
        let start = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let clock = Arc::new(FixedClock::new(start));
        let repo = TodoRepository::new(Arc::new(MemoryStore::new()), clock.clone());

        repo.create(&json!({"title": "first", "completed": true})).await.unwrap();
        clock.advance(Duration::seconds(1));
        repo.create(&json!({"title": "second", "priority": "high"})).await.unwrap();
        clock.advance(Duration::seconds(1));
        repo.create(&json!({"title": "third", "completed": true, "priority": "high"}))
            .await
            .unwrap();

        let all: Vec<String> = repo
            .find_all(TodoFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|todo| todo.title)
            .collect();
        assert_eq!(all, vec!["third", "second", "first"]);

        let done = repo
            .find_all(TodoFilter { completed: Some(true), priority: None })
            .await
            .unwrap();
        assert_eq!(done.len(), 2);
        assert!(done.iter().all(|todo| todo.completed));

        let urgent_open = repo
            .find_all(TodoFilter { completed: Some(false), priority: Some(Priority::High) })
            .await
            .unwrap();
        assert_eq!(urgent_open.len(), 1);
        assert_eq!(urgent_open[0].title, "second");
    }

    #[tokio::test]
    async fn find_all_on_empty_store_is_empty() {
        assert!(repository().find_all(TodoFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_by_id_rejects_malformed_id() {
        let err = repository().find_by_id("not-an-id").await.unwrap_err();
        assert!(matches!(err, TodoError::InvalidId));
    }

    #[tokio::test]
    async fn delete_reports_whether_a_record_was_removed() {
        let repo = repository();
        let created = repo.create(&json!({"title": "Temp"})).await.unwrap();
        let id = created.id.to_string();

        assert!(repo.delete(&id).await.unwrap());
        assert!(!repo.delete(&id).await.unwrap());
        assert!(repo.find_by_id(&id).await.unwrap().is_none());
        assert!(matches!(repo.delete("xyz").await, Err(TodoError::InvalidId)));
    }

    #[tokio::test]
    async fn stats_on_empty_collection_are_zero() {
        assert_eq!(repository().stats().await.unwrap(), TodoStats::default());
    }

    #[tokio::test]
    async fn stats_track_toggles() {
        let repo = repository();
        let todo = repo.create(&json!({"title": "Buy milk", "priority": "high"})).await.unwrap();
        repo.create(&json!({"title": "Read"})).await.unwrap();
        repo.toggle_complete(&todo.id.to_string()).await.unwrap();

        assert_eq!(
            repo.stats().await.unwrap(),
            TodoStats {
                total: 2,
                completed: 1,
                pending: 1,
                high_priority: 1,
            }
        );
    }
}
