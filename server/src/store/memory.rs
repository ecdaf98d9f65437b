use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{StoreError, TodoStore};
use crate::model::{NewTodo, Todo, TodoChanges, TodoId};

/// In-process store keyed by id. Cloning shares the underlying map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    todos: Arc<RwLock<BTreeMap<TodoId, Todo>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.todos.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.todos.read().await.is_empty()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn find_all(&self) -> Result<Vec<Todo>, StoreError> {
        let todos = self.todos.read().await;
        Ok(todos.values().cloned().collect())
    }

    async fn find_one(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        Ok(self.todos.read().await.get(&id).cloned())
    }

    async fn insert_one(&self, todo: NewTodo) -> Result<TodoId, StoreError> {
        let id = TodoId::generate();
        let todo = Todo {
            id,
            title: todo.title,
            completed: todo.completed,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
        };
        self.todos.write().await.insert(id, todo);
        Ok(id)
    }

    async fn update_one(&self, id: TodoId, changes: TodoChanges) -> Result<bool, StoreError> {
        let mut todos = self.todos.write().await;
        match todos.get_mut(&id) {
            Some(todo) => {
                changes.apply(todo);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_one(&self, id: TodoId) -> Result<bool, StoreError> {
        Ok(self.todos.write().await.remove(&id).is_some())
    }
}
