//! HTTP CRUD API for todo records kept in a document store.
//!
//! # Overview
//! `app` mounts four routes under `/todos` on top of a `TodoHandler`, which
//! owns the request-to-persistence rules. The handler talks to an injected
//! `TodoStore`: MongoDB in production, an in-process map in tests.

use std::future::Future;

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod database;
pub mod error;
pub mod handler;
pub mod model;
pub mod payload;
pub mod store;

pub use config::{Config, ConfigError, StoreKind};
pub use database::Database;
pub use error::{ErrorBody, TodoError};
pub use handler::TodoHandler;
pub use model::{Todo, TodoId};
pub use payload::TodoFields;
pub use store::{MemoryStore, MongoStore, StoreError, TodoStore};

/// Body of every successful create, update and delete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoIdBody {
    pub id: TodoId,
}

pub fn app(handler: TodoHandler) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", put(update_todo).delete(delete_todo))
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}

/// Serve `app(handler)` on `listener` until `shutdown` resolves.
pub async fn run<F>(
    listener: TcpListener,
    handler: TodoHandler,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(handler))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn list_todos(State(handler): State<TodoHandler>) -> Result<Json<Vec<Todo>>, TodoError> {
    handler.list().await.map(Json)
}

async fn create_todo(
    State(handler): State<TodoHandler>,
    fields: TodoFields,
) -> Result<Json<TodoIdBody>, TodoError> {
    let id = handler.create(fields).await?;
    Ok(Json(TodoIdBody { id }))
}

async fn update_todo(
    State(handler): State<TodoHandler>,
    Path(id): Path<String>,
    fields: TodoFields,
) -> Result<Json<TodoIdBody>, TodoError> {
    let id = handler.update(&id, fields).await?;
    Ok(Json(TodoIdBody { id }))
}

async fn delete_todo(
    State(handler): State<TodoHandler>,
    Path(id): Path<String>,
) -> Result<Json<TodoIdBody>, TodoError> {
    let id = handler.delete(&id).await?;
    Ok(Json(TodoIdBody { id }))
}
