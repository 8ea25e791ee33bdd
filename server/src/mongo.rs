//! `TodoStore` backed by a MongoDB collection.
//!
//! # Design
//! Records are written with `doc!` so that absent optional fields are left
//! out of the document instead of stored as null, and read back through
//! `TodoDocument`. Timestamps are BSON dates (millisecond precision).

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Bson, Document};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection, Database};
use serde::Deserialize;
use todo_core::{NewTodo, Priority, Todo, TodoError, TodoFilter, TodoId, TodoPatch, TodoStats, TodoStore};

pub const COLLECTION: &str = "todos";

/// Connect and verify the deployment answers a ping.
pub async fn connect(uri: &str, database: &str) -> Result<Client, mongodb::error::Error> {
    let client = Client::with_uri_str(uri).await?;
    client.database(database).run_command(doc! { "ping": 1 }).await?;
    Ok(client)
}

#[derive(Debug, Clone)]
pub struct MongoStore {
    collection: Collection<Document>,
}

impl MongoStore {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(COLLECTION),
        }
    }
}

#[async_trait]
impl TodoStore for MongoStore {
    async fn insert(&self, todo: NewTodo) -> Result<Todo, TodoError> {
        let result = self
            .collection
            .insert_one(new_todo_document(&todo))
            .await
            .map_err(TodoError::store)?;
        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| TodoError::Store(format!("unexpected inserted id {}", result.inserted_id)))?;
        Ok(todo.into_todo(id.into()))
    }

    async fn find(&self, filter: TodoFilter) -> Result<Vec<Todo>, TodoError> {
        let documents: Vec<Document> = self
            .collection
            .find(filter_document(&filter))
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .await
            .map_err(TodoError::store)?
            .try_collect()
            .await
            .map_err(TodoError::store)?;
        documents.into_iter().map(todo_from_document).collect()
    }

    async fn find_one(&self, id: TodoId) -> Result<Option<Todo>, TodoError> {
        self.collection
            .find_one(doc! { "_id": id.object_id() })
            .await
            .map_err(TodoError::store)?
            .map(todo_from_document)
            .transpose()
    }

    async fn merge(&self, id: TodoId, patch: TodoPatch) -> Result<Option<Todo>, TodoError> {
        self.collection
            .find_one_and_update(doc! { "_id": id.object_id() }, doc! { "$set": set_document(&patch) })
            .return_document(ReturnDocument::After)
            .await
            .map_err(TodoError::store)?
            .map(todo_from_document)
            .transpose()
    }

    async fn remove(&self, id: TodoId) -> Result<bool, TodoError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id.object_id() })
            .await
            .map_err(TodoError::store)?;
        Ok(result.deleted_count > 0)
    }

    async fn stats(&self) -> Result<TodoStats, TodoError> {
        let pipeline = vec![doc! {
            "$group": {
                "_id": Bson::Null,
                "total": { "$sum": 1 },
                "completed": { "$sum": { "$cond": [{ "$eq": ["$completed", true] }, 1, 0] } },
                "highPriority": { "$sum": { "$cond": [{ "$eq": ["$priority", "high"] }, 1, 0] } },
            }
        }];
        let group = self
            .collection
            .aggregate(pipeline)
            .await
            .map_err(TodoError::store)?
            .try_next()
            .await
            .map_err(TodoError::store)?;
        // an empty collection produces no group at all
        Ok(group.map(|group| stats_from_group(&group)).unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TodoDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    completed: bool,
    priority: Priority,
    #[serde(default)]
    due_date: Option<bson::DateTime>,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl From<TodoDocument> for Todo {
    fn from(document: TodoDocument) -> Self {
        Todo {
            id: document.id.into(),
            title: document.title,
            description: document.description,
            completed: document.completed,
            priority: document.priority,
            due_date: document.due_date.map(to_chrono),
            created_at: to_chrono(document.created_at),
            updated_at: to_chrono(document.updated_at),
        }
    }
}

fn todo_from_document(document: Document) -> Result<Todo, TodoError> {
    bson::from_document::<TodoDocument>(document)
        .map(Todo::from)
        .map_err(TodoError::store)
}

fn new_todo_document(todo: &NewTodo) -> Document {
    let mut document = doc! {
        "title": &todo.title,
        "completed": todo.completed,
        "priority": todo.priority.as_str(),
        "createdAt": to_bson(todo.created_at),
        "updatedAt": to_bson(todo.updated_at),
    };
    if let Some(description) = &todo.description {
        document.insert("description", description);
    }
    if let Some(due_date) = todo.due_date {
        document.insert("dueDate", to_bson(due_date));
    }
    document
}

fn set_document(patch: &TodoPatch) -> Document {
    let mut document = doc! { "updatedAt": to_bson(patch.updated_at) };
    if let Some(title) = &patch.title {
        document.insert("title", title);
    }
    if let Some(description) = &patch.description {
        document.insert("description", description);
    }
    if let Some(completed) = patch.completed {
        document.insert("completed", completed);
    }
    if let Some(priority) = patch.priority {
        document.insert("priority", priority.as_str());
    }
    if let Some(due_date) = patch.due_date {
        document.insert("dueDate", to_bson(due_date));
    }
    document
}

fn filter_document(filter: &TodoFilter) -> Document {
    let mut document = Document::new();
    if let Some(completed) = filter.completed {
        document.insert("completed", completed);
    }
    if let Some(priority) = filter.priority {
        document.insert("priority", priority.as_str());
    }
    document
}

fn stats_from_group(group: &Document) -> TodoStats {
    let count = |key: &str| match group.get(key) {
        Some(Bson::Int32(n)) => u64::try_from(*n).unwrap_or(0),
        Some(Bson::Int64(n)) => u64::try_from(*n).unwrap_or(0),
        _ => 0,
    };
    let total = count("total");
    let completed = count("completed");
    TodoStats {
        total,
        completed,
        pending: total.saturating_sub(completed),
        high_priority: count("highPriority"),
    }
}

fn to_bson(at: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(at.timestamp_millis())
}

fn to_chrono(at: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or_default()
}
