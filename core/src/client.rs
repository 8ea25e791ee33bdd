//! Stateless request builder and envelope parser for the `/api/todos` API.
//!
//! # Design
//! `TodoClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse` and unwraps the `{success, data, error}`
//! envelope. The caller executes the round-trip in between.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Envelope, Todo, TodoFilter, TodoId, TodoStats, UpdateTodo};

#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_list_todos(&self, filter: &TodoFilter) -> HttpRequest {
        let mut query = Vec::new();
        if let Some(completed) = filter.completed {
            query.push(format!("completed={completed}"));
        }
        if let Some(priority) = filter.priority {
            query.push(format!("priority={priority}"));
        }
        let mut path = self.todos_url();
        if !query.is_empty() {
            path = format!("{path}?{}", query.join("&"));
        }
        self.request(HttpMethod::Get, path)
    }

    pub fn build_get_todo(&self, id: &TodoId) -> HttpRequest {
        self.request(HttpMethod::Get, format!("{}/{id}", self.todos_url()))
    }

    pub fn build_stats(&self) -> HttpRequest {
        self.request(HttpMethod::Get, format!("{}/stats", self.todos_url()))
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, self.todos_url(), input)
    }

    pub fn build_update_todo(&self, id: &TodoId, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, format!("{}/{id}", self.todos_url()), input)
    }

    pub fn build_toggle_todo(&self, id: &TodoId) -> HttpRequest {
        self.request(HttpMethod::Patch, format!("{}/{id}/toggle", self.todos_url()))
    }

    pub fn build_delete_todo(&self, id: &TodoId) -> HttpRequest {
        self.request(HttpMethod::Delete, format!("{}/{id}", self.todos_url()))
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        parse_data(response, 200)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_data(response, 200)
    }

    pub fn parse_stats(&self, response: HttpResponse) -> Result<TodoStats, ApiError> {
        parse_data(response, 200)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_data(response, 201)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_data(response, 200)
    }

    pub fn parse_toggle_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_data(response, 200)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_envelope::<()>(response, 200).map(|_| ())
    }

    fn todos_url(&self) -> String {
        format!("{}/api/todos", self.base_url)
    }

    fn request(&self, method: HttpMethod, path: String) -> HttpRequest {
        HttpRequest {
            method,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    fn json_request<T: Serialize>(&self, method: HttpMethod, path: String, input: &T) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

fn parse_data<T: DeserializeOwned>(response: HttpResponse, expected: u16) -> Result<T, ApiError> {
    parse_envelope(response, expected)?
        .data
        .ok_or_else(|| ApiError::Deserialization("envelope has no data".to_string()))
}

/// Map non-success statuses to the appropriate `ApiError` variant, then decode
/// the envelope.
fn parse_envelope<T: DeserializeOwned>(response: HttpResponse, expected: u16) -> Result<Envelope<T>, ApiError> {
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    if response.status != expected {
        let message = serde_json::from_str::<Envelope<serde_json::Value>>(&response.body)
            .ok()
            .and_then(|envelope| envelope.error)
            .unwrap_or(response.body);
        return Err(ApiError::Rejected {
            status: response.status,
            message,
        });
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
