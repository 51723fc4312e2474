use std::{future::Future, pin::Pin};

mod document;
mod document_parser;
mod errors;
mod secured;
mod store;

pub mod stores {
    pub mod file;
    pub mod in_memory;
}

mod utils {
    pub(crate) mod files;
    pub(crate) mod ids;
}

pub use document::{to_fields, Document, DocumentId, Fields, Filter};
pub use document_parser::{DocumentParser, IDocumentParser, JsonParser, TomlParser, YamlParser};
pub use errors::{StoreError, StoreResult};
pub use secured::{AccessRule, AccessRules, AuthContext, SecuredStore};
pub use store::{Collection, DocumentStore, DocumentStoreBox};

pub type PinFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
