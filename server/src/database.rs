//! The single long-lived MongoDB connection.
//!
//! Opened once at start-up, shared by every request through the store built
//! on top of it, closed after the HTTP server has drained.

use bson::doc;
use mongodb::{Client, Collection};
use tracing::info;

use crate::store::StoreError;

#[derive(Clone, Debug)]
pub struct Database {
    client: Client,
    database: mongodb::Database,
}

impl Database {
    /// Connect to `uri` and select `db_name`, verifying the server answers.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let database = Self {
            database: client.database(db_name),
            client,
        };
        database.ping().await?;
        info!(db = db_name, "connected to MongoDB");
        Ok(database)
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.database.collection(name)
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    pub async fn close(self) {
        self.client.shutdown().await;
        info!("MongoDB connection closed");
    }
}
