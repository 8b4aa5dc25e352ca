use std::cell::RefCell;
use std::fmt;

use bson::{Bson, Document};
use quill_query::{DocumentStore, UpdateResult};

/// A dispatched store call, as the store received it.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub op: &'static str,
    pub collection: String,
    pub filter: Option<Document>,
    pub payload: Option<Document>,
    pub options: Option<Document>,
}

#[derive(Debug)]
pub struct StoreDown;

impl fmt::Display for StoreDown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store unavailable")
    }
}

impl std::error::Error for StoreDown {}

/// In-memory fake that records every call and answers with canned documents.
#[derive(Default)]
pub struct RecordingStore {
    pub calls: RefCell<Vec<Call>>,
    pub results: Vec<Document>,
    pub fail: bool,
}

impl RecordingStore {
    pub fn with_results(results: Vec<Document>) -> Self {
        Self {
            results,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn last(&self) -> Call {
        self.calls.borrow().last().cloned().expect("no store call recorded")
    }

    fn record(
        &self,
        op: &'static str,
        collection: &str,
        filter: Option<Document>,
        payload: Option<Document>,
        options: Option<Document>,
    ) -> Result<(), StoreDown> {
        self.calls.borrow_mut().push(Call {
            op,
            collection: collection.to_string(),
            filter,
            payload,
            options,
        });
        if self.fail { Err(StoreDown) } else { Ok(()) }
    }
}

impl DocumentStore for RecordingStore {
    type Error = StoreDown;

    fn find(
        &self,
        collection: &str,
        filter: Document,
        options: Document,
    ) -> Result<Vec<Document>, StoreDown> {
        self.record("find", collection, Some(filter), None, Some(options))?;
        Ok(self.results.clone())
    }

    fn find_one(
        &self,
        collection: &str,
        filter: Document,
        options: Document,
    ) -> Result<Option<Document>, StoreDown> {
        self.record("find_one", collection, Some(filter), None, Some(options))?;
        Ok(self.results.first().cloned())
    }

    fn insert_one(&self, collection: &str, doc: Document) -> Result<Bson, StoreDown> {
        let id = doc.get("_id").cloned().unwrap_or(Bson::Null);
        self.record("insert_one", collection, None, Some(doc), None)?;
        Ok(id)
    }

    fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<Vec<Bson>, StoreDown> {
        let mut ids = Vec::new();
        for doc in docs {
            ids.push(doc.get("_id").cloned().unwrap_or(Bson::Null));
            self.record("insert_many", collection, None, Some(doc), None)?;
        }
        Ok(ids)
    }

    fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<UpdateResult, StoreDown> {
        self.record("update_one", collection, Some(filter), Some(update), None)?;
        Ok(UpdateResult {
            matched: 1,
            modified: 1,
        })
    }

    fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<UpdateResult, StoreDown> {
        self.record("update_many", collection, Some(filter), Some(update), None)?;
        Ok(UpdateResult {
            matched: self.results.len() as u64,
            modified: self.results.len() as u64,
        })
    }

    fn delete_one(
        &self,
        collection: &str,
        filter: Document,
        options: Document,
    ) -> Result<u64, StoreDown> {
        self.record("delete_one", collection, Some(filter), None, Some(options))?;
        Ok(1)
    }

    fn delete_many(
        &self,
        collection: &str,
        filter: Document,
        options: Document,
    ) -> Result<u64, StoreDown> {
        self.record("delete_many", collection, Some(filter), None, Some(options))?;
        Ok(self.results.len() as u64)
    }
}
