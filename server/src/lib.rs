//! HTTP surface of the todo service.
//!
//! `app` assembles the full router around a `TodoRepository`; the binary
//! decides which store backs it.

pub mod config;
pub mod error;
pub mod mongo;
pub mod routes;

use std::future::Future;

use axum::http::{Method, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use todo_core::{Envelope, TodoRepository};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn app(repository: TodoRepository) -> Router {
    Router::new()
        .route("/", get(discovery))
        .route("/health", get(health))
        .nest("/api/todos", routes::router(repository))
        .fallback(route_not_found)
        .method_not_allowed_fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors())
}

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn run<F>(listener: TcpListener, repository: TodoRepository, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(repository))
        .with_graceful_shutdown(shutdown)
        .await
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": "Todo API",
    }))
}

async fn discovery() -> Json<Value> {
    Json(json!({
        "message": "Todo API Backend",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "GET /api/todos": "Get all todos",
            "GET /api/todos/stats": "Get todo statistics",
            "GET /api/todos/:id": "Get todo by ID",
            "POST /api/todos": "Create new todo",
            "PUT /api/todos/:id": "Update todo",
            "PATCH /api/todos/:id/toggle": "Toggle todo completion",
            "DELETE /api/todos/:id": "Delete todo",
        },
    }))
}

pub(crate) async fn route_not_found() -> (StatusCode, Json<Envelope<()>>) {
    (StatusCode::NOT_FOUND, Json(Envelope::failure("Route not found")))
}
