use std::sync::Arc;

use derive_more::Deref;

use crate::{Document, DocumentId, Fields, Filter, PinFuture, StoreResult};

/// A document database split in named collections.
pub trait DocumentStore: Send + Sync {
    /// List the documents of `collection` matching `filter`, ordered by id
    fn query<'a>(
        &'a self,
        collection: &'a str,
        filter: &'a Filter,
    ) -> PinFuture<'a, StoreResult<Vec<Document>>>;

    // Get a document by id
    fn get<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
    ) -> PinFuture<'a, StoreResult<Option<Document>>>;

    /// Insert a new document, the store assigns its id
    fn insert<'a>(
        &'a self,
        collection: &'a str,
        fields: Fields,
    ) -> PinFuture<'a, StoreResult<DocumentId>>;

    /// Overwrite the given fields of an existing document, other fields are kept
    fn update<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
        fields: Fields,
    ) -> PinFuture<'a, StoreResult<()>>;

    /// Delete a document by id, deleting a missing document is not an error
    fn delete<'a>(&'a self, collection: &'a str, id: &'a str) -> PinFuture<'a, StoreResult<()>>;
}

#[derive(Deref, Clone)]
#[deref(forward)]
pub struct DocumentStoreBox(Arc<dyn DocumentStore>);

impl DocumentStoreBox {
    pub fn new(store: impl DocumentStore + 'static) -> Self {
        Self(Arc::new(store))
    }
}

/// Handle on a single named collection of a store.
#[derive(Clone)]
pub struct Collection {
    store: DocumentStoreBox,
    name: String,
}

impl Collection {
    pub fn new(store: DocumentStoreBox, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
        }
    }

    pub async fn query(&self, filter: &Filter) -> StoreResult<Vec<Document>> {
        self.store.query(&self.name, filter).await
    }

    pub async fn insert(&self, fields: Fields) -> StoreResult<DocumentId> {
        self.store.insert(&self.name, fields).await
    }

    pub async fn update(&self, id: &str, fields: Fields) -> StoreResult<()> {
        self.store.update(&self.name, id, fields).await
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        self.store.delete(&self.name, id).await
    }
}
