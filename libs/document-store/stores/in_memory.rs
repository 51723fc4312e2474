use std::collections::BTreeMap;

use dashmap::DashMap;
use tracing::debug;

use crate::{
    utils::ids::IdGenerator, Document, DocumentId, DocumentStore, Fields, Filter, PinFuture,
    StoreError, StoreResult,
};

/// This store is used for testing and throwaway profiles, data is not
/// persisted to disk but only present in memory
#[derive(Default)]
pub struct InMemoryStore {
    collections: DashMap<String, BTreeMap<DocumentId, Fields>>,
    ids: IdGenerator,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for InMemoryStore {
    fn query<'a>(
        &'a self,
        collection: &'a str,
        filter: &'a Filter,
    ) -> PinFuture<'a, StoreResult<Vec<Document>>> {
        Box::pin(async move {
            let documents = self
                .collections
                .get(collection)
                .map(|documents| {
                    documents
                        .iter()
                        .filter(|(_, fields)| filter.matches(fields))
                        .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();

            debug!(collection, count = documents.len(), "in-memory query");
            Ok(documents)
        })
    }

    fn get<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
    ) -> PinFuture<'a, StoreResult<Option<Document>>> {
        Box::pin(async move {
            Ok(self.collections.get(collection).and_then(|documents| {
                documents
                    .get(id)
                    .map(|fields| Document::new(id, fields.clone()))
            }))
        })
    }

    fn insert<'a>(
        &'a self,
        collection: &'a str,
        fields: Fields,
    ) -> PinFuture<'a, StoreResult<DocumentId>> {
        Box::pin(async move {
            let id = self.ids.next_id();
            self.collections
                .entry(collection.to_owned())
                .or_default()
                .insert(id.clone(), fields);

            debug!(collection, id = %id, "in-memory insert");
            Ok(id)
        })
    }

    fn update<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
        fields: Fields,
    ) -> PinFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            let mut documents =
                self.collections
                    .get_mut(collection)
                    .ok_or_else(|| StoreError::NotFound {
                        collection: collection.to_owned(),
                        id: id.to_owned(),
                    })?;

            let existing = documents.get_mut(id).ok_or_else(|| StoreError::NotFound {
                collection: collection.to_owned(),
                id: id.to_owned(),
            })?;
            existing.extend(fields);

            debug!(collection, id, "in-memory update");
            Ok(())
        })
    }

    fn delete<'a>(&'a self, collection: &'a str, id: &'a str) -> PinFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            if let Some(mut documents) = self.collections.get_mut(collection) {
                documents.remove(id);
            }

            debug!(collection, id, "in-memory delete");
            Ok(())
        })
    }
}
