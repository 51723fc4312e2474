use thiserror::Error;

use crate::DocumentId;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document '{id}' not found in collection '{collection}'")]
    NotFound {
        collection: String,
        id: DocumentId,
    },
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("request is not authenticated")]
    Unauthenticated,
    #[error("invalid path segment '{0}'")]
    InvalidPath(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("couldn't parse document: {0}")]
    Parse(String),
    #[error("couldn't parse store document: {0}")]
    CorruptedDocument(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
