//! The todo resource handler: maps list/create/update/delete requests onto
//! single-document store operations.

use std::sync::Arc;

use tracing::debug;

use crate::error::{TodoError, MISSING_TITLE, NOTHING_TO_UPDATE};
use crate::model::{now, NewTodo, Todo, TodoChanges, TodoId};
use crate::payload::TodoFields;
use crate::store::TodoStore;

/// Todo operations over an injected store. Cheap to clone; clones share the
/// store handle.
#[derive(Clone)]
pub struct TodoHandler {
    store: Arc<dyn TodoStore>,
}

impl TodoHandler {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Todo>, TodoError> {
        let todos = self.store.find_all().await?;
        debug!(count = todos.len(), "listed todos");
        Ok(todos)
    }

    /// Insert a todo with `completed = false`. Only `title` is read from
    /// `fields`.
    pub async fn create(&self, fields: TodoFields) -> Result<TodoId, TodoError> {
        let title = fields
            .title
            .ok_or_else(|| TodoError::validation(MISSING_TITLE))?;

        let created_at = now();
        let id = self
            .store
            .insert_one(NewTodo {
                title,
                completed: false,
                created_at,
                updated_at: created_at,
            })
            .await?;
        debug!(%id, "created todo");
        Ok(id)
    }

    /// Apply the supplied fields to an existing todo and refresh `updatedAt`.
    ///
    /// An unknown id is reported before an empty field set.
    pub async fn update(&self, id: &str, fields: TodoFields) -> Result<TodoId, TodoError> {
        let id = TodoId::parse(id)?;
        self.ensure_exists(id).await?;

        if fields.is_empty() {
            return Err(TodoError::validation(NOTHING_TO_UPDATE));
        }

        let changes = TodoChanges {
            title: fields.title,
            completed: fields.completed,
            updated_at: now(),
        };
        // deleted between the lookup and the write
        if !self.store.update_one(id, changes).await? {
            return Err(TodoError::not_found());
        }
        debug!(%id, "updated todo");
        Ok(id)
    }

    pub async fn delete(&self, id: &str) -> Result<TodoId, TodoError> {
        let id = TodoId::parse(id)?;
        self.ensure_exists(id).await?;

        if !self.store.delete_one(id).await? {
            return Err(TodoError::not_found());
        }
        debug!(%id, "deleted todo");
        Ok(id)
    }

    async fn ensure_exists(&self, id: TodoId) -> Result<(), TodoError> {
        match self.store.find_one(id).await? {
            Some(_) => Ok(()),
            None => {
                debug!(%id, "no todo with this id");
                Err(TodoError::not_found())
            }
        }
    }
}
