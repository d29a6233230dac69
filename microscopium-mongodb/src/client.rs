//! MongoDB client wrapper with built-in connection pooling.

use std::sync::Arc;

use bson::{Document, doc};
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::{Client, Collection, Database};
use tracing::{debug, info};

use crate::config::MongoConfig;
use crate::error::{MongoError, MongoResult};

/// A MongoDB client with connection pooling.
///
/// The driver pools connections internally; cloning is cheap and every clone
/// shares the same pool. Create one per process and call
/// [`MongoClient::shutdown`] before exiting.
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    database: Database,
    config: Arc<MongoConfig>,
}

impl MongoClient {
    /// Create a new client from configuration.
    ///
    /// No connection is made until the first operation.
    pub async fn new(config: MongoConfig) -> MongoResult<Self> {
        let options = config.to_client_options().await?;

        let client = Client::with_options(options)
            .map_err(|e| MongoError::connection(format!("failed to create client: {}", e)))?;

        let database = client.database(&config.database);

        info!(
            uri = %config.uri,
            database = %config.database,
            "MongoDB client created"
        );

        Ok(Self {
            client,
            database,
            config: Arc::new(config),
        })
    }

    /// Get a collection with BSON documents.
    pub fn collection_doc(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }

    /// Get the underlying database.
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Get the configuration.
    pub fn config(&self) -> &MongoConfig {
        &self.config
    }

    /// Ping the server.
    pub async fn ping(&self) -> MongoResult<()> {
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    /// List all collection names in the database.
    pub async fn list_collections(&self) -> MongoResult<Vec<String>> {
        let names = self.database.list_collection_names(None).await?;
        Ok(names)
    }

    /// Run `find` and drain the cursor.
    pub async fn find_documents(
        &self,
        collection: &str,
        filter: Document,
        projection: Option<Document>,
    ) -> MongoResult<Vec<Document>> {
        debug!(
            collection = %collection,
            filter = %filter,
            projection = ?projection,
            "Executing find"
        );

        let mut options = FindOptions::default();
        options.projection = projection;

        let cursor = self
            .collection_doc(collection)
            .find(filter, options)
            .await?;
        let docs: Vec<Document> = cursor.try_collect().await?;

        debug!(collection = %collection, count = docs.len(), "find complete");
        Ok(docs)
    }

    /// Run `find_one`.
    pub async fn find_one_document(
        &self,
        collection: &str,
        filter: Document,
    ) -> MongoResult<Option<Document>> {
        debug!(collection = %collection, filter = %filter, "Executing find_one");
        let doc = self.collection_doc(collection).find_one(filter, None).await?;
        Ok(doc)
    }

    /// Close the connection pool.
    ///
    /// Waits for operations in flight on any clone to finish.
    pub async fn shutdown(self) {
        info!(database = %self.config.database, "Shutting down MongoDB client");
        self.client.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_does_not_connect() {
        let client = MongoClient::new(MongoConfig::from_uri(
            "mongodb://localhost:27017",
            "microscopium",
        ))
        .await
        .unwrap();
        assert_eq!(client.config().database, "microscopium");
        assert_eq!(client.database().name(), "microscopium");
    }
}
