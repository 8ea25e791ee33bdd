//! Domain core for the todo service.
//!
//! # Overview
//! Everything the HTTP layer delegates to: the record schema and its
//! validation rules, the `TodoStore` seam with an in-process implementation,
//! and `TodoRepository`, which ties them together. Also ships `TodoClient`, a
//! stateless client for the service's JSON API that builds `HttpRequest`
//! values and parses `HttpResponse` values without touching the network.
//!
//! # Design
//! - Write paths go through `validate`: candidates are raw JSON so every bad
//!   field is reported, not only the first.
//! - Timestamps come from an injected `Clock` at millisecond precision.
//! - Stores never validate; the repository never caches.

pub mod client;
pub mod clock;
pub mod error;
pub mod http;
pub mod repository;
pub mod store;
pub mod types;
pub mod validate;

pub use client::TodoClient;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ApiError, TodoError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use repository::TodoRepository;
pub use store::{MemoryStore, TodoStore};
pub use types::{
    CreateTodo, Envelope, NewTodo, Priority, Todo, TodoFilter, TodoId, TodoPatch, TodoStats, UpdateTodo,
};
