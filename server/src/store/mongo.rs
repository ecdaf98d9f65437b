//! `TodoStore` over the `todos` collection.
//!
//! Documents written here always carry BSON dates. Documents read back may
//! also come from older writers that stored `createdAt`/`updatedAt` as
//! RFC 3339 strings, or left `createdAt` out; both shapes are accepted.

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::Collection;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use super::{StoreError, TodoStore, COLLECTION};
use crate::database::Database;
use crate::model::{NewTodo, Todo, TodoChanges, TodoId};

/// Shape of a todo as this store inserts it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TodoDocument {
    title: String,
    completed: bool,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl From<NewTodo> for TodoDocument {
    fn from(todo: NewTodo) -> Self {
        Self {
            title: todo.title,
            completed: todo.completed,
            created_at: bson::DateTime::from_chrono(todo.created_at),
            updated_at: bson::DateTime::from_chrono(todo.updated_at),
        }
    }
}

/// Shape of a todo as it may be found in the collection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTodo {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    #[serde(default)]
    completed: bool,
    #[serde(default, deserialize_with = "stored_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "stored_timestamp")]
    updated_at: Option<DateTime<Utc>>,
}

/// A BSON date or an RFC 3339 string.
fn stored_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<Bson>::deserialize(deserializer)? {
        None | Some(Bson::Null) => Ok(None),
        Some(Bson::DateTime(at)) => Ok(Some(at.to_chrono())),
        Some(Bson::String(raw)) => DateTime::parse_from_rfc3339(&raw)
            .map(|at| Some(at.with_timezone(&Utc)))
            .map_err(|error| D::Error::custom(format!("timestamp {raw:?}: {error}"))),
        Some(other) => Err(D::Error::custom(format!(
            "timestamp must be a date or a string, found {other}"
        ))),
    }
}

impl TryFrom<StoredTodo> for Todo {
    type Error = StoreError;

    fn try_from(stored: StoredTodo) -> Result<Self, Self::Error> {
        // a missing createdAt takes the last update time, and the other way round
        let (created_at, updated_at) = match (stored.created_at, stored.updated_at) {
            (Some(created_at), Some(updated_at)) => (created_at, updated_at),
            (Some(at), None) | (None, Some(at)) => (at, at),
            (None, None) => {
                return Err(StoreError::Corrupt(format!(
                    "todo {} has neither createdAt nor updatedAt",
                    stored.id
                )))
            }
        };
        Ok(Todo {
            id: stored.id.into(),
            title: stored.title,
            completed: stored.completed,
            created_at,
            updated_at,
        })
    }
}

fn read_todo(document: Document) -> Result<Todo, StoreError> {
    let stored: StoredTodo = bson::from_document(document)
        .map_err(|error| StoreError::Corrupt(error.to_string()))?;
    Todo::try_from(stored)
}

/// Body of the `$set` for `changes`: `updatedAt` plus each supplied field.
fn set_document(changes: &TodoChanges) -> Document {
    let mut set = doc! { "updatedAt": bson::DateTime::from_chrono(changes.updated_at) };
    if let Some(title) = &changes.title {
        set.insert("title", title.as_str());
    }
    if let Some(completed) = changes.completed {
        set.insert("completed", completed);
    }
    set
}

#[derive(Clone, Debug)]
pub struct MongoStore {
    inserts: Collection<TodoDocument>,
    documents: Collection<Document>,
}

impl MongoStore {
    pub fn new(database: &Database) -> Self {
        Self {
            inserts: database.collection(COLLECTION),
            documents: database.collection(COLLECTION),
        }
    }
}

#[async_trait]
impl TodoStore for MongoStore {
    /// Documents that cannot be read as a todo are logged and left out.
    async fn find_all(&self) -> Result<Vec<Todo>, StoreError> {
        let documents: Vec<Document> = self
            .documents
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;

        let mut todos = Vec::with_capacity(documents.len());
        for document in documents {
            let id = document.get("_id").cloned();
            match read_todo(document) {
                Ok(todo) => todos.push(todo),
                Err(error) => warn!(?id, %error, "skipping unreadable todo document"),
            }
        }
        Ok(todos)
    }

    async fn find_one(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        self.documents
            .find_one(doc! { "_id": id.object_id() })
            .await?
            .map(read_todo)
            .transpose()
    }

    async fn insert_one(&self, todo: NewTodo) -> Result<TodoId, StoreError> {
        let result = self.inserts.insert_one(TodoDocument::from(todo)).await?;
        result
            .inserted_id
            .as_object_id()
            .map(TodoId::from)
            .ok_or_else(|| {
                StoreError::Corrupt(format!("inserted id {} is not an ObjectId", result.inserted_id))
            })
    }

    async fn update_one(&self, id: TodoId, changes: TodoChanges) -> Result<bool, StoreError> {
        let result = self
            .documents
            .update_one(
                doc! { "_id": id.object_id() },
                doc! { "$set": set_document(&changes) },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_one(&self, id: TodoId) -> Result<bool, StoreError> {
        let result = self
            .documents
            .delete_one(doc! { "_id": id.object_id() })
            .await?;
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::now;
    use rstest::rstest;

    fn at(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn new_todo_document_leaves_id_to_the_driver() {
        let at = now();
        let document = TodoDocument::from(NewTodo {
            title: "Buy milk".to_string(),
            completed: false,
            created_at: at,
            updated_at: at,
        });
        let bson = bson::to_document(&document).unwrap();

        assert!(!bson.contains_key("_id"));
        assert_eq!(bson.get_str("title").unwrap(), "Buy milk");
        assert!(!bson.get_bool("completed").unwrap());
        assert_eq!(
            bson.get_datetime("createdAt").unwrap(),
            bson.get_datetime("updatedAt").unwrap()
        );
    }

    #[test]
    fn document_maps_back_to_todo() {
        let id = ObjectId::new();
        let at = now();
        let todo = read_todo(doc! {
            "_id": id,
            "title": "Walk dog",
            "completed": true,
            "createdAt": bson::DateTime::from_chrono(at),
            "updatedAt": bson::DateTime::from_chrono(at),
        })
        .unwrap();

        assert_eq!(todo.id.object_id(), id);
        assert_eq!(todo.title, "Walk dog");
        assert!(todo.completed);
        assert_eq!(todo.created_at, at);
        assert_eq!(todo.updated_at, at);
    }

    #[test]
    fn string_dates_without_created_at_are_read() {
        let todo = read_todo(doc! {
            "_id": ObjectId::new(),
            "title": "test",
            "completed": false,
            "completedAt": "2022-01-20T10:32:50.952Z",
            "updatedAt": "2022-01-20T10:32:50.952Z",
        })
        .unwrap();

        assert_eq!(todo.title, "test");
        assert!(!todo.completed);
        assert_eq!(todo.created_at, at("2022-01-20T10:32:50.952Z"));
        assert_eq!(todo.updated_at, at("2022-01-20T10:32:50.952Z"));
    }

    #[test]
    fn date_created_at_with_string_updated_at_is_read() {
        let created = at("2022-01-20T10:32:50.952Z");
        let todo = read_todo(doc! {
            "_id": ObjectId::new(),
            "title": "Walk dog",
            "completed": true,
            "createdAt": bson::DateTime::from_chrono(created),
            "updatedAt": "2022-01-21T08:00:00.000Z",
        })
        .unwrap();

        assert_eq!(todo.created_at, created);
        assert_eq!(todo.updated_at, at("2022-01-21T08:00:00.000Z"));
    }

    #[test]
    fn missing_completed_reads_as_open() {
        let todo = read_todo(doc! {
            "_id": ObjectId::new(),
            "title": "Walk dog",
            "updatedAt": "2022-01-20T10:32:50.952Z",
        })
        .unwrap();
        assert!(!todo.completed);
    }

    #[rstest]
    #[case::no_id(doc! { "title": "orphan", "createdAt": "2022-01-20T10:32:50.952Z" })]
    #[case::no_timestamps(doc! { "_id": ObjectId::new(), "title": "timeless" })]
    #[case::numeric_timestamp(doc! { "_id": ObjectId::new(), "title": "x", "updatedAt": 42 })]
    #[case::unparsable_timestamp(doc! { "_id": ObjectId::new(), "title": "x", "updatedAt": "yesterday" })]
    fn unreadable_documents_are_corrupt(#[case] document: Document) {
        let err = read_todo(document).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[rstest]
    #[case::title_only(Some("Walk cat"), None)]
    #[case::completed_false_only(None, Some(false))]
    #[case::completed_true_only(None, Some(true))]
    #[case::both(Some("Walk cat"), Some(false))]
    fn set_document_holds_only_supplied_fields(
        #[case] title: Option<&str>,
        #[case] completed: Option<bool>,
    ) {
        let updated_at = now();
        let set = set_document(&TodoChanges {
            title: title.map(str::to_string),
            completed,
            updated_at,
        });

        assert_eq!(
            set.get_datetime("updatedAt").unwrap(),
            &bson::DateTime::from_chrono(updated_at)
        );
        assert_eq!(set.get_str("title").ok(), title);
        assert_eq!(set.get_bool("completed").ok(), completed);
        let expected_len = 1 + usize::from(title.is_some()) + usize::from(completed.is_some());
        assert_eq!(set.len(), expected_len);
    }
}
