//! Schema rules for candidate todo records.
//!
//! # Design
//! Candidates arrive as raw JSON so that every field can be checked
//! independently: a typed deserialize would stop at the first bad field,
//! while callers expect one message per failed field. Unknown keys are
//! dropped. Both modes share the per-field rules; create mode additionally
//! requires `title` and fills in defaults.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::clock::truncate_millis;
use crate::error::ValidationError;
use crate::types::{NewTodo, Priority, TodoPatch};

/// Maximum title length in UTF-16 code units, the unit browsers count in.
pub const TITLE_MAX_LEN: usize = 200;

const NOT_AN_OBJECT: &str = "Expected an object";
const TITLE_REQUIRED: &str = "Title is required";
const TITLE_NOT_STRING: &str = "Title must be a string";
const TITLE_TOO_LONG: &str = "Title too long";
const DESCRIPTION_NOT_STRING: &str = "Description must be a string";
const COMPLETED_NOT_BOOLEAN: &str = "Completed must be a boolean";
const PRIORITY_INVALID: &str = "Priority must be one of: low, medium, high";
const DUE_DATE_INVALID: &str = "Due date must be a valid ISO 8601 datetime";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Create,
    Update,
}

#[derive(Debug, Default)]
struct Fields {
    title: Option<String>,
    description: Option<String>,
    completed: Option<bool>,
    priority: Option<Priority>,
    due_date: Option<DateTime<Utc>>,
}

/// Validate a full record for insertion.
///
/// `created_at` and `updated_at` are both set to `now`; any timestamps in the
/// candidate are ignored.
pub fn validate_create(candidate: &Value, now: DateTime<Utc>) -> Result<NewTodo, ValidationError> {
    let fields = read_fields(candidate, Mode::Create)?;
    Ok(NewTodo {
        // read_fields reports a missing title in create mode
        title: fields.title.unwrap_or_default(),
        description: fields.description,
        completed: fields.completed.unwrap_or(false),
        priority: fields.priority.unwrap_or_default(),
        due_date: fields.due_date,
        created_at: now,
        updated_at: now,
    })
}

/// Validate a partial record for a merge-update.
///
/// Only fields present in the candidate end up in the patch. `createdAt` is
/// never accepted; `updated_at` is always `now`.
pub fn validate_update(candidate: &Value, now: DateTime<Utc>) -> Result<TodoPatch, ValidationError> {
    let fields = read_fields(candidate, Mode::Update)?;
    Ok(TodoPatch {
        title: fields.title,
        description: fields.description,
        completed: fields.completed,
        priority: fields.priority,
        due_date: fields.due_date,
        updated_at: now,
    })
}

fn read_fields(candidate: &Value, mode: Mode) -> Result<Fields, ValidationError> {
    let object = candidate
        .as_object()
        .ok_or_else(|| ValidationError::new(vec![NOT_AN_OBJECT.to_string()]))?;

    let mut errors = Vec::new();
    let title = match object.get("title") {
        None if mode == Mode::Create => {
            errors.push(TITLE_REQUIRED.to_string());
            None
        }
        None => None,
        Some(value) => check(title(value), &mut errors),
    };
    let fields = Fields {
        title,
        description: field(object, "description", description, &mut errors),
        completed: field(object, "completed", completed, &mut errors),
        priority: field(object, "priority", priority, &mut errors),
        due_date: field(object, "dueDate", due_date, &mut errors),
    };

    if errors.is_empty() {
        Ok(fields)
    } else {
        Err(ValidationError::new(errors))
    }
}

fn field<T>(
    object: &Map<String, Value>,
    key: &str,
    rule: fn(&Value) -> Result<T, &'static str>,
    errors: &mut Vec<String>,
) -> Option<T> {
    object.get(key).and_then(|value| check(rule(value), errors))
}

fn check<T>(result: Result<T, &'static str>, errors: &mut Vec<String>) -> Option<T> {
    result.map_err(|message| errors.push(message.to_string())).ok()
}

fn title(value: &Value) -> Result<String, &'static str> {
    let title = value.as_str().ok_or(TITLE_NOT_STRING)?;
    match title.encode_utf16().count() {
        0 => Err(TITLE_REQUIRED),
        n if n > TITLE_MAX_LEN => Err(TITLE_TOO_LONG),
        _ => Ok(title.to_string()),
    }
}

fn description(value: &Value) -> Result<String, &'static str> {
    value.as_str().map(str::to_string).ok_or(DESCRIPTION_NOT_STRING)
}

fn completed(value: &Value) -> Result<bool, &'static str> {
    value.as_bool().ok_or(COMPLETED_NOT_BOOLEAN)
}

fn priority(value: &Value) -> Result<Priority, &'static str> {
    value.as_str().and_then(Priority::parse).ok_or(PRIORITY_INVALID)
}

fn due_date(value: &Value) -> Result<DateTime<Utc>, &'static str> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|at| truncate_millis(at.with_timezone(&Utc)))
        .ok_or(DUE_DATE_INVALID)
}
