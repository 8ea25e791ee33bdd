//! Domain types for the todo API.
//!
//! # Design
//! `Todo` is both the stored record and the wire representation, so the JSON
//! field names (`_id`, `dueDate`, `createdAt`, ...) are fixed here with serde
//! attributes. Validated write payloads (`NewTodo`, `TodoPatch`) are separate
//! types: a `NewTodo` has no id yet, and a `TodoPatch` cannot carry a
//! `created_at` at all.

use std::fmt;
use std::str::FromStr;

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TodoError;

/// Store-assigned identifier of a todo: a 12-byte ObjectId, written as 24 hex
/// digits on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TodoId(ObjectId);

impl TodoId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    /// Parse the textual form, failing with `TodoError::InvalidId` for
    /// anything other than 24 hex digits.
    pub fn parse(s: &str) -> Result<Self, TodoError> {
        ObjectId::parse_str(s).map(Self).map_err(|_| TodoError::InvalidId)
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for TodoId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl FromStr for TodoId {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl Serialize for TodoId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}

impl<'de> Deserialize<'de> for TodoId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::parse(s).ok_or_else(|| format!("unknown priority `{s}`"))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted todo record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    #[serde(rename = "_id")]
    pub id: TodoId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated create payload, ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewTodo {
    pub fn into_todo(self, id: TodoId) -> Todo {
        Todo {
            id,
            title: self.title,
            description: self.description,
            completed: self.completed,
            priority: self.priority,
            due_date: self.due_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A validated merge-update. `None` fields leave the stored value untouched;
/// `updated_at` is always written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl TodoPatch {
    pub fn apply(self, todo: &mut Todo) {
        if let Some(title) = self.title {
            todo.title = title;
        }
        if let Some(description) = self.description {
            todo.description = Some(description);
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        if let Some(priority) = self.priority {
            todo.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            todo.due_date = Some(due_date);
        }
        todo.updated_at = self.updated_at;
    }
}

/// Optional constraints for listing todos. Absent fields match everything.
///
/// Deserializes straight from the list endpoint's query string, where an
/// empty value (`?priority=`) is the same as leaving the parameter out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoFilter {
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.is_empty() => raw.parse().map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

impl TodoFilter {
    pub fn matches(&self, todo: &Todo) -> bool {
        self.completed.map_or(true, |completed| todo.completed == completed)
            && self.priority.map_or(true, |priority| todo.priority == priority)
    }
}

/// Aggregate counts over the whole collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoStats {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    pub high_priority: u64,
}

/// Response envelope shared by every `/api/todos` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            count: None,
            message: None,
        }
    }
}

impl<T> Envelope<Vec<T>> {
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        Self {
            count: Some(count),
            ..Self::data(items)
        }
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            count: None,
            message: Some(message.into()),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            count: None,
            message: None,
        }
    }
}

/// Request payload for creating a todo through `TodoClient`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Request payload for updating a todo through `TodoClient`. Only the fields
/// present in the JSON are applied; omitted fields remain unchanged on the
/// server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Todo {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Todo {
            id: TodoId::parse("65f1a2b3c4d5e6f708192a3b").unwrap(),
            title: "Buy milk".to_string(),
            description: None,
            completed: false,
            priority: Priority::High,
            due_date: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn todo_id_parses_24_hex_digits() {
        let id = TodoId::parse("65f1a2b3c4d5e6f708192a3b").unwrap();
        assert_eq!(id.to_string(), "65f1a2b3c4d5e6f708192a3b");
    }

    #[test]
    fn todo_id_rejects_malformed_input() {
        for bad in ["", "not-an-id", "65f1a2b3c4d5e6f708192a3", "zzf1a2b3c4d5e6f708192a3b"] {
            assert!(matches!(TodoId::parse(bad), Err(TodoError::InvalidId)), "{bad}");
        }
    }

    #[test]
    fn todo_serializes_with_wire_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["_id"], "65f1a2b3c4d5e6f708192a3b");
        assert_eq!(json["priority"], "high");
        assert_eq!(json["createdAt"], "2024-05-01T12:00:00Z");
        assert!(json.get("description").is_none());
        assert!(json.get("dueDate").is_none());
    }

    #[test]
    fn filter_matches_only_constrained_fields() {
        let todo = sample();
        assert!(TodoFilter::default().matches(&todo));
        assert!(TodoFilter { completed: Some(false), priority: None }.matches(&todo));
        assert!(!TodoFilter { completed: Some(true), priority: None }.matches(&todo));
        assert!(!TodoFilter { completed: None, priority: Some(Priority::Low) }.matches(&todo));
    }

    #[test]
    fn filter_treats_empty_values_as_absent() {
        let filter: TodoFilter = serde_json::from_value(serde_json::json!({"completed": "", "priority": ""})).unwrap();
        assert_eq!(filter, TodoFilter::default());

        let filter: TodoFilter =
            serde_json::from_value(serde_json::json!({"completed": "true", "priority": "high"})).unwrap();
        assert_eq!(filter.completed, Some(true));
        assert_eq!(filter.priority, Some(Priority::High));

        assert!(serde_json::from_value::<TodoFilter>(serde_json::json!({"priority": "urgent"})).is_err());
        assert!(serde_json::from_value::<TodoFilter>(serde_json::json!({"completed": "yes"})).is_err());
    }

    #[test]
    fn patch_leaves_absent_fields_untouched() {
        let mut todo = sample();
        let later = todo.updated_at + chrono::Duration::seconds(5);
        TodoPatch {
            title: None,
            description: Some("2 litres".to_string()),
            completed: None,
            priority: None,
            due_date: None,
            updated_at: later,
        }
        .apply(&mut todo);

        assert_eq!(todo.title, "Buy milk");
        assert_eq!(todo.priority, Priority::High);
        assert_eq!(todo.description.as_deref(), Some("2 litres"));
        assert_eq!(todo.updated_at, later);
        assert_ne!(todo.created_at, later);
    }

    #[test]
    fn list_envelope_carries_count() {
        let json = serde_json::to_value(Envelope::list(vec![sample(), sample()])).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 2);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn todo_envelope_parses_back_from_json() {
        let text = serde_json::to_string(&Envelope::data(sample())).unwrap();
        let envelope: Envelope<Todo> = serde_json::from_str(&text).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.data, Some(sample()));
        assert_eq!(envelope.count, None);

        let envelope: Envelope<Todo> = serde_json::from_str(r#"{"success":false,"error":"Todo not found"}"#).unwrap();
        assert!(envelope.data.is_none());
        assert_eq!(envelope.error.as_deref(), Some("Todo not found"));
    }

    #[test]
    fn failure_envelope_omits_data() {
        let json = serde_json::to_value(Envelope::failure("Todo not found")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "Todo not found"}));
    }
}
