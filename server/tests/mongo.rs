//! `MongoStore` against a live server.
//!
//! Ignored by default. Run with a reachable MongoDB:
//! `MONGODB_URI=mongodb://localhost:27017 cargo test -p todo-server --test mongo -- --ignored --test-threads=1`

use std::sync::Arc;

use bson::Document;
use todo_server::store::COLLECTION;
use todo_server::{Database, MongoStore, TodoError, TodoFields, TodoHandler, TodoId, TodoStore};

async fn connect() -> Database {
    dotenvy::dotenv().ok();
    let uri = std::env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let db = std::env::var("MONGODB_DB").unwrap_or_else(|_| "mytodos-test".to_string());
    let database = Database::connect(&uri, &db).await.expect("MongoDB reachable");
    database
        .collection::<Document>(COLLECTION)
        .drop()
        .await
        .expect("drop todos collection");
    database
}

fn title(title: &str) -> TodoFields {
    TodoFields {
        title: Some(title.to_string()),
        completed: None,
    }
}

#[tokio::test]
#[ignore]
async fn handler_round_trip_against_mongo() {
    let database = connect().await;
    let store = MongoStore::new(&database);
    let handler = TodoHandler::new(Arc::new(store.clone()));

    assert!(handler.list().await.unwrap().is_empty());

    let first = handler.create(title("first")).await.unwrap();
    let second = handler.create(title("second")).await.unwrap();
    let listed: Vec<TodoId> = handler.list().await.unwrap().iter().map(|todo| todo.id).collect();
    assert_eq!(listed, vec![first, second]);

    let created = store.find_one(first).await.unwrap().unwrap();
    assert_eq!(created.created_at, created.updated_at);
    assert!(!created.completed);

    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    let fields = TodoFields {
        title: None,
        completed: Some(false),
    };
    handler.update(&first.to_string(), fields).await.unwrap();
    let updated = store.find_one(first).await.unwrap().unwrap();
    assert_eq!(updated.title, "first");
    assert!(!updated.completed);
    assert!(updated.updated_at > created.updated_at);

    handler.delete(&second.to_string()).await.unwrap();
    let err = handler.delete(&second.to_string()).await.unwrap_err();
    assert!(matches!(err, TodoError::NotFound(_)));
    assert_eq!(handler.list().await.unwrap().len(), 1);

    database.close().await;
}

#[tokio::test]
#[ignore]
async fn list_reads_string_dates_and_skips_unreadable_documents() {
    let database = connect().await;
    let documents = database.collection::<Document>(COLLECTION);
    documents
        .insert_many([
            bson::doc! {
                "title": "test",
                "completed": false,
                "completedAt": "2022-01-20T10:32:50.952Z",
                "updatedAt": "2022-01-20T10:32:50.952Z",
            },
            bson::doc! { "title": "timeless" },
        ])
        .await
        .unwrap();

    let store = MongoStore::new(&database);
    let todos = store.find_all().await.unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].title, "test");
    assert_eq!(todos[0].created_at, todos[0].updated_at);

    database.close().await;
}
