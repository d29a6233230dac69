//! The read-only document store interface.

use async_trait::async_trait;
use bson::Document;
use microscopium_query::FindQuery;

use crate::client::MongoClient;
use crate::error::MongoResult;

/// Read access to named collections of BSON documents.
///
/// Implementations return documents in the order the backend yields them.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents of `collection` matching `filter`, limited to
    /// `projection` when given.
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        projection: Option<Document>,
    ) -> MongoResult<Vec<Document>>;

    /// The first document of `collection` matching `filter`.
    async fn find_one(&self, collection: &str, filter: Document) -> MongoResult<Option<Document>>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> MongoResult<()>;

    /// Run a [`FindQuery`].
    async fn find_query(&self, query: &FindQuery) -> MongoResult<Vec<Document>> {
        self.find(
            query.collection,
            query.filter.clone(),
            query.projection_document(),
        )
        .await
    }
}

#[async_trait]
impl DocumentStore for MongoClient {
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        projection: Option<Document>,
    ) -> MongoResult<Vec<Document>> {
        self.find_documents(collection, filter, projection).await
    }

    async fn find_one(&self, collection: &str, filter: Document) -> MongoResult<Option<Document>> {
        self.find_one_document(collection, filter).await
    }

    async fn ping(&self) -> MongoResult<()> {
        MongoClient::ping(self).await
    }
}
