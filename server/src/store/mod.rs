//! Document-store handle the todo handler is built on.
//!
//! `TodoStore` is the narrow slice of a document collection the handler
//! needs: find, find-one, insert-one, update-one and delete-one. Each call is
//! a single-document operation and relies on the backend's own atomicity.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{NewTodo, Todo, TodoChanges, TodoId};

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Name of the collection todos live in.
pub const COLLECTION: &str = "todos";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid todo id {0:?}")]
    InvalidId(String),

    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// A stored document that does not map onto a `Todo`.
    #[error("corrupt todo document: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Every todo, sorted by id ascending.
    async fn find_all(&self) -> Result<Vec<Todo>, StoreError>;

    async fn find_one(&self, id: TodoId) -> Result<Option<Todo>, StoreError>;

    async fn insert_one(&self, todo: NewTodo) -> Result<TodoId, StoreError>;

    /// Returns `false` when no document matched `id`.
    async fn update_one(&self, id: TodoId, changes: TodoChanges) -> Result<bool, StoreError>;

    /// Returns `false` when no document matched `id`.
    async fn delete_one(&self, id: TodoId) -> Result<bool, StoreError>;
}
