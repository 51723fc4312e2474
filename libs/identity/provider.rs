use std::sync::Arc;

use derive_more::Deref;

use crate::{EventListener, Identity, IdentityResult, PinFuture};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(Identity),
    SignedOut,
}

impl SessionEvent {
    pub fn from_session(identity: Option<Identity>) -> Self {
        match identity {
            Some(identity) => SessionEvent::SignedIn(identity),
            None => SessionEvent::SignedOut,
        }
    }
}

pub type SessionListener = EventListener<SessionEvent>;

pub trait IdentityProvider: Send + Sync {
    fn current_identity(&self) -> Option<Identity>;

    /// Listen to session changes, the current session state is delivered first
    fn subscribe(&self) -> SessionListener;

    fn unsubscribe(&self, listener_id: u64);

    /// Create an account and open a session for it
    fn sign_up<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> PinFuture<'a, IdentityResult<Identity>>;

    fn sign_in<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> PinFuture<'a, IdentityResult<Identity>>;

    fn sign_out(&self) -> PinFuture<'_, IdentityResult<()>>;
}

#[derive(Deref, Clone)]
#[deref(forward)]
pub struct IdentityProviderBox(Arc<dyn IdentityProvider>);

impl IdentityProviderBox {
    pub fn new(provider: impl IdentityProvider + 'static) -> Self {
        Self(Arc::new(provider))
    }
}
