//! Access rules evaluated by the store itself, in front of any backend.
//!
//! Every request is made on behalf of the principal reported by the
//! [`AuthContext`]. A collection is only reachable when a rule is declared for
//! it; with [`AccessRule::OwnerField`] a document belongs to the principal
//! whose identity is stored in the owner field, and nobody else can read,
//! change or delete it. Queries are narrowed to the principal's documents
//! whatever filter the caller sends.

use std::{collections::HashMap, sync::Arc};

use serde_json::Value;
use tracing::warn;

use crate::{
    Document, DocumentId, DocumentStore, Fields, Filter, PinFuture, StoreError, StoreResult,
};

/// Source of the identity a request is made for.
pub trait AuthContext: Send + Sync {
    fn principal(&self) -> Option<String>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum AccessRule {
    /// Documents are owned by the principal stored in this field
    OwnerField(String),
}

impl AccessRule {
    pub fn owner_field(field: impl Into<String>) -> Self {
        AccessRule::OwnerField(field.into())
    }
}

#[derive(Clone, Debug, Default)]
pub struct AccessRules {
    rules: HashMap<String, AccessRule>,
}

impl AccessRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, collection: impl Into<String>, rule: AccessRule) -> Self {
        self.rules.insert(collection.into(), rule);
        self
    }

    pub fn get(&self, collection: &str) -> Option<&AccessRule> {
        self.rules.get(collection)
    }
}

pub struct SecuredStore<S: DocumentStore> {
    inner: S,
    rules: AccessRules,
    auth: Arc<dyn AuthContext>,
}

/// The authenticated principal and the owner field of the collection it targets
struct Grant<'r> {
    principal: String,
    owner_field: &'r str,
}

impl Grant<'_> {
    fn owns(&self, fields: &Fields) -> bool {
        matches!(fields.get(self.owner_field), Some(Value::String(owner)) if *owner == self.principal)
    }

    fn deny(&self, collection: &str, action: &str) -> StoreError {
        warn!(
            collection,
            principal = %self.principal,
            action,
            "access denied"
        );
        StoreError::PermissionDenied(format!(
            "'{}' is not allowed to {action} this document of '{collection}'",
            self.principal
        ))
    }
}

impl<S: DocumentStore> SecuredStore<S> {
    pub fn new(inner: S, rules: AccessRules, auth: Arc<dyn AuthContext>) -> Self {
        Self { inner, rules, auth }
    }

    fn authorize(&self, collection: &str) -> StoreResult<Grant<'_>> {
        let principal = self.auth.principal().ok_or_else(|| {
            warn!(collection, "unauthenticated request");
            StoreError::Unauthenticated
        })?;

        match self.rules.get(collection) {
            Some(AccessRule::OwnerField(owner_field)) => Ok(Grant {
                principal,
                owner_field,
            }),
            None => {
                warn!(collection, principal = %principal, "no access rule for collection");
                Err(StoreError::PermissionDenied(format!(
                    "collection '{collection}' is not accessible"
                )))
            }
        }
    }
}

impl<S: DocumentStore> DocumentStore for SecuredStore<S> {
    fn query<'a>(
        &'a self,
        collection: &'a str,
        filter: &'a Filter,
    ) -> PinFuture<'a, StoreResult<Vec<Document>>> {
        Box::pin(async move {
            let grant = self.authorize(collection)?;
            let scoped = filter.clone().and(Filter::field_eq(
                grant.owner_field,
                grant.principal.clone(),
            ));
            self.inner.query(collection, &scoped).await
        })
    }

    fn get<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
    ) -> PinFuture<'a, StoreResult<Option<Document>>> {
        Box::pin(async move {
            let grant = self.authorize(collection)?;
            match self.inner.get(collection, id).await? {
                Some(document) if !grant.owns(&document.fields) => {
                    Err(grant.deny(collection, "read"))
                }
                document => Ok(document),
            }
        })
    }

    fn insert<'a>(
        &'a self,
        collection: &'a str,
        fields: Fields,
    ) -> PinFuture<'a, StoreResult<DocumentId>> {
        Box::pin(async move {
            let grant = self.authorize(collection)?;
            if !grant.owns(&fields) {
                return Err(grant.deny(collection, "create"));
            }
            self.inner.insert(collection, fields).await
        })
    }

    fn update<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
        fields: Fields,
    ) -> PinFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            let grant = self.authorize(collection)?;
            let existing =
                self.inner
                    .get(collection, id)
                    .await?
                    .ok_or_else(|| StoreError::NotFound {
                        collection: collection.to_owned(),
                        id: id.to_owned(),
                    })?;

            if !grant.owns(&existing.fields) {
                return Err(grant.deny(collection, "update"));
            }
            // the owner binding is immutable
            if fields.contains_key(grant.owner_field) && !grant.owns(&fields) {
                return Err(grant.deny(collection, "reassign"));
            }

            self.inner.update(collection, id, fields).await
        })
    }

    fn delete<'a>(&'a self, collection: &'a str, id: &'a str) -> PinFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            let grant = self.authorize(collection)?;
            match self.inner.get(collection, id).await? {
                Some(existing) if !grant.owns(&existing.fields) => {
                    Err(grant.deny(collection, "delete"))
                }
                Some(_) => self.inner.delete(collection, id).await,
                None => Ok(()),
            }
        })
    }
}
