use bson::{Bson, Document};

/// Outcome of an update dispatched to a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    pub matched: u64,
    pub modified: u64,
}

/// The document database the compiled documents are handed to.
///
/// Implementations own transport, pooling and retries. Every method receives
/// documents that are already compiled: `filter` uses `$`-prefixed operator
/// keys, `update` is a `{"$set": {...}}` document, `options` carries
/// `sort` / `limit` / `skip`.
pub trait DocumentStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn find(
        &self,
        collection: &str,
        filter: Document,
        options: Document,
    ) -> Result<Vec<Document>, Self::Error>;

    fn find_one(
        &self,
        collection: &str,
        filter: Document,
        options: Document,
    ) -> Result<Option<Document>, Self::Error>;

    /// Returns the inserted id.
    fn insert_one(&self, collection: &str, doc: Document) -> Result<Bson, Self::Error>;

    fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<Vec<Bson>, Self::Error>;

    fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<UpdateResult, Self::Error>;

    fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<UpdateResult, Self::Error>;

    /// Returns the number of deleted documents.
    fn delete_one(
        &self,
        collection: &str,
        filter: Document,
        options: Document,
    ) -> Result<u64, Self::Error>;

    fn delete_many(
        &self,
        collection: &str,
        filter: Document,
        options: Document,
    ) -> Result<u64, Self::Error>;
}
