//! Wire DTOs for the todo API.
//!
//! Ids stay opaque strings here; only the server knows they are ObjectIds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A todo as listed by `GET /todos`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for `POST /todos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub title: String,
}

/// Request payload for `PUT /todos/{id}`. Omitted fields are left unchanged;
/// at least one must be set or the server answers 422.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// `{"id": ...}` returned by create, update and delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoIdBody {
    pub id: String,
}

/// `{"errorMsg": ...}` returned by every failed request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorBody {
    pub error_msg: String,
}
