//! Todo records as the handler and the stores exchange them.
//!
//! # Design
//! `TodoId` wraps a BSON `ObjectId` so both store backends order records the
//! same way (by id, ascending). On the wire it is the 24-character hex form.
//! Timestamps are cut to millisecond precision before they are stored, which
//! is all a BSON date can hold.

use std::fmt;
use std::str::FromStr;

use bson::oid::ObjectId;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Store-assigned identifier of a todo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TodoId(ObjectId);

impl TodoId {
    /// Mint a fresh identifier. Only stores that assign ids themselves call this.
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    /// Parse the hex form used in paths and response bodies.
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        ObjectId::parse_str(raw)
            .map(Self)
            .map_err(|_| StoreError::InvalidId(raw.to_string()))
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for TodoId {
    fn from(id: ObjectId) -> Self {
        Self(id)
    }
}

impl FromStr for TodoId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TodoId {
    type Error = StoreError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<TodoId> for String {
    fn from(id: TodoId) -> Self {
        id.0.to_hex()
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

/// A stored todo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A todo about to be inserted. The store assigns the id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields to `$set` on an existing todo. `None` leaves the field untouched;
/// `updated_at` is always written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl TodoChanges {
    pub fn apply(self, todo: &mut Todo) {
        if let Some(title) = self.title {
            todo.title = title;
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        todo.updated_at = self.updated_at;
    }
}

/// Current time at the precision the document store keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
