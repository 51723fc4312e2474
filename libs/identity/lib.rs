use std::{future::Future, pin::Pin};

mod errors;
mod event_emitter;
mod identity;
mod local;
mod provider;

pub use errors::{IdentityError, IdentityResult};
pub use event_emitter::{EventEmitter, EventListener};
pub use identity::{normalize_email, Identity};
pub use local::LocalIdentityProvider;
pub use provider::{IdentityProvider, IdentityProviderBox, SessionEvent, SessionListener};

pub type PinFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
