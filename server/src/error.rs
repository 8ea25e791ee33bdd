//! Translation of handler failures into HTTP responses.
//!
//! This is the only place where an error kind becomes a status code. Store
//! faults are logged in full and answered with a generic message.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use todo_core::{Envelope, TodoError};

const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error(transparent)]
    Todo(#[from] TodoError),

    /// The request could not be decoded (malformed JSON body or query).
    #[error("{0}")]
    BadRequest(String),
}

impl RouteError {
    pub fn status(&self) -> StatusCode {
        match self {
            RouteError::Todo(TodoError::Validation(_) | TodoError::InvalidId) | RouteError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            RouteError::Todo(TodoError::NotFound) => StatusCode::NOT_FOUND,
            RouteError::Todo(TodoError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for RouteError {
    fn from(rejection: JsonRejection) -> Self {
        RouteError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for RouteError {
    fn from(rejection: QueryRejection) -> Self {
        RouteError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            RouteError::Todo(TodoError::Store(detail)) => {
                tracing::error!(%detail, "todo store failure");
                INTERNAL_ERROR.to_string()
            }
            other => other.to_string(),
        };
        (status, Json(Envelope::failure(message))).into_response()
    }
}
