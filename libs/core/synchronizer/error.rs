use taskboard_document_store::StoreError;
use taskboard_identity::IdentityError;

pub type Result<T> = core::result::Result<T, SyncError>;

#[derive(thiserror::Error, Debug)]
pub enum SyncError {
    #[error("no active session, sign in first")]
    NoSession,

    #[error("a task needs a title")]
    EmptyTitle,

    #[error("task '{0}' was not found")]
    TaskNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}
