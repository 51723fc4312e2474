use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    utils::{
        files::{check_path_segment, document_file_name, write_atomic},
        ids::IdGenerator,
    },
    Document, DocumentId, DocumentParser, DocumentStore, Fields, Filter, PinFuture, StoreError,
    StoreResult,
};

/// Store keeping one directory per collection and one file per document:
/// `<root>/<collection>/<id>.<ext>`
pub struct FileStore {
    root: PathBuf,
    parser: DocumentParser,
    write_lock: Mutex<()>,
    ids: IdGenerator,
}

impl FileStore {
    pub async fn try_new(root: impl AsRef<Path>, parser: DocumentParser) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await?;

        Ok(Self {
            root,
            parser,
            write_lock: Mutex::new(()),
            ids: IdGenerator::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, collection: &str) -> StoreResult<PathBuf> {
        Ok(self.root.join(check_path_segment(collection)?))
    }

    fn document_path(&self, collection: &str, id: &str) -> StoreResult<PathBuf> {
        let file_name = document_file_name(check_path_segment(id)?, self.parser.file_extension());
        Ok(self.collection_path(collection)?.join(file_name))
    }

    async fn read_fields(&self, path: &Path) -> StoreResult<Option<Fields>> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(self.parser.deserialize(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_fields(&self, path: &Path, fields: &Fields) -> StoreResult<()> {
        let content = self.parser.serialize(fields)?;
        write_atomic(path, &content).await
    }

    /// Ids of every document of the collection, sorted
    async fn list_ids(&self, collection: &str) -> StoreResult<Vec<DocumentId>> {
        let path = self.collection_path(collection)?;
        let mut entries = match tokio::fs::read_dir(&path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let extension = self.parser.file_extension();
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_path = entry.path();
            if file_path.extension().and_then(|e| e.to_str()) != Some(extension) {
                continue;
            }
            match file_path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if check_path_segment(stem).is_ok() => ids.push(stem.to_owned()),
                _ => warn!(path = ?file_path, "skipping unexpected file in collection"),
            }
        }

        ids.sort();
        Ok(ids)
    }
}

impl DocumentStore for FileStore {
    fn query<'a>(
        &'a self,
        collection: &'a str,
        filter: &'a Filter,
    ) -> PinFuture<'a, StoreResult<Vec<Document>>> {
        Box::pin(async move {
            let mut documents = Vec::new();
            for id in self.list_ids(collection).await? {
                let path = self.document_path(collection, &id)?;
                // removed between listing and reading
                let Some(fields) = self.read_fields(&path).await? else {
                    continue;
                };
                if filter.matches(&fields) {
                    documents.push(Document::new(id, fields));
                }
            }

            debug!(collection, count = documents.len(), "file query");
            Ok(documents)
        })
    }

    fn get<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
    ) -> PinFuture<'a, StoreResult<Option<Document>>> {
        Box::pin(async move {
            let path = self.document_path(collection, id)?;
            Ok(self
                .read_fields(&path)
                .await?
                .map(|fields| Document::new(id, fields)))
        })
    }

    fn insert<'a>(
        &'a self,
        collection: &'a str,
        fields: Fields,
    ) -> PinFuture<'a, StoreResult<DocumentId>> {
        Box::pin(async move {
            let _guard = self.write_lock.lock().await;

            tokio::fs::create_dir_all(self.collection_path(collection)?).await?;
            let id = self.ids.next_id();
            let path = self.document_path(collection, &id)?;
            self.write_fields(&path, &fields).await?;

            debug!(collection, id = %id, "file insert");
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
            let _guard = self.write_lock.lock().await;

            let path = self.document_path(collection, id)?;
            let mut existing =
                self.read_fields(&path)
                    .await?
                    .ok_or_else(|| StoreError::NotFound {
                        collection: collection.to_owned(),
                        id: id.to_owned(),
                    })?;
            existing.extend(fields);
            self.write_fields(&path, &existing).await?;

            debug!(collection, id, "file update");
            Ok(())
        })
    }

    fn delete<'a>(&'a self, collection: &'a str, id: &'a str) -> PinFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            let _guard = self.write_lock.lock().await;

            let path = self.document_path(collection, id)?;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }

            debug!(collection, id, "file delete");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{to_fields, JsonParser, TomlParser, YamlParser};
    use serde_json::json;

    async fn setup(parser: DocumentParser) -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::try_new(dir.path().join("db"), parser)
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn documents_land_in_collection_directories() -> eyre::Result<()> {
        let (_dir, store) = setup(JsonParser::get()).await;
        let id = store
            .insert("tasks", to_fields(&json!({ "title": "a" }))?)
            .await?;

        let expected = store.root().join("tasks").join(format!("{id}.json"));
        assert!(expected.exists());
        Ok(())
    }

    #[tokio::test]
    async fn crud_in_every_format() -> eyre::Result<()> {
        for parser in [JsonParser::get(), TomlParser::get(), YamlParser::get()] {
            let (_dir, store) = setup(parser).await;

            let id = store
                .insert(
                    "tasks",
                    to_fields(&json!({ "owner": "a", "completed": false }))?,
                )
                .await?;
            store
                .insert("tasks", to_fields(&json!({ "owner": "b", "completed": false }))?)
                .await?;

            store
                .update("tasks", &id, to_fields(&json!({ "completed": true }))?)
                .await?;

            let docs = store
                .query("tasks", &Filter::field_eq("owner", "a"))
                .await?;
            assert_eq!(docs.len(), 1);
            assert_eq!(docs[0].field("completed"), Some(&json!(true)));

            store.delete("tasks", &id).await?;
            assert!(store.get("tasks", &id).await?.is_none());
            assert_eq!(store.query("tasks", &Filter::All).await?.len(), 1);
        }
        Ok(())
    }

    #[tokio::test]
    async fn documents_survive_reopening() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let id = {
            let store = FileStore::try_new(dir.path(), JsonParser::get()).await?;
            store
                .insert("tasks", to_fields(&json!({ "title": "kept" }))?)
                .await?
        };

        let store = FileStore::try_new(dir.path(), JsonParser::get()).await?;
        let doc = store.get("tasks", &id).await?.unwrap();
        assert_eq!(doc.field("title"), Some(&json!("kept")));
        Ok(())
    }

    #[tokio::test]
    async fn path_traversal_is_rejected() -> eyre::Result<()> {
        let (_dir, store) = setup(JsonParser::get()).await;

        let err = store.get("tasks", "../secret").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath(_)));

        let err = store.insert("../tasks", Fields::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath(_)));
        Ok(())
    }

    #[tokio::test]
    async fn update_missing_and_delete_missing() -> eyre::Result<()> {
        let (_dir, store) = setup(JsonParser::get()).await;

        let err = store
            .update("tasks", "nope", Fields::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        store.delete("tasks", "nope").await?;
        Ok(())
    }

    #[tokio::test]
    async fn query_on_empty_collection() -> eyre::Result<()> {
        let (_dir, store) = setup(JsonParser::get()).await;
        assert!(store.query("tasks", &Filter::All).await?.is_empty());
        Ok(())
    }
}
