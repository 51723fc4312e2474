use std::time::Duration;

use taskboard_identity::{Identity, IdentityProviderBox, SessionEvent, SessionListener};
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardStatus {
    /// No session state received yet
    Pending,
    Redirect { route: String },
    Ready(Identity),
}

/// Gate in front of the dashboard: resolves to the signed-in identity, or to
/// the login route when nobody is signed in.
pub struct SessionGuard {
    provider: IdentityProviderBox,
    listener: Option<SessionListener>,
    login_route: String,
    status: GuardStatus,
}

impl SessionGuard {
    pub fn mount(provider: IdentityProviderBox, login_route: impl Into<String>) -> Self {
        let listener = provider.subscribe();
        debug!(listener_id = listener.id, "session guard mounted");

        Self {
            provider,
            listener: Some(listener),
            login_route: login_route.into(),
            status: GuardStatus::Pending,
        }
    }

    /// Apply every session change received since the last poll
    pub fn poll(&mut self) -> GuardStatus {
        if let Some(event) = self.listener.as_ref().and_then(|l| l.latest()) {
            self.apply(event);
        }
        self.status.clone()
    }

    /// Like [`SessionGuard::poll`], waiting up to `timeout` while still pending
    pub fn wait(&mut self, timeout: Duration) -> GuardStatus {
        if self.status == GuardStatus::Pending {
            if let Some(event) = self.listener.as_ref().and_then(|l| l.next_timeout(timeout)) {
                self.apply(event);
            }
        }
        self.poll()
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.status {
            GuardStatus::Ready(identity) => Some(identity),
            _ => None,
        }
    }

    /// Stop listening to session changes, the last status is kept
    pub fn teardown(&mut self) {
        if let Some(listener) = self.listener.take() {
            self.provider.unsubscribe(listener.id);
            debug!(listener_id = listener.id, "session guard torn down");
        }
    }

    fn apply(&mut self, event: SessionEvent) {
        self.status = match event {
            SessionEvent::SignedIn(identity) => GuardStatus::Ready(identity),
            SessionEvent::SignedOut => {
                info!(route = %self.login_route, "no active session, redirecting");
                GuardStatus::Redirect {
                    route: self.login_route.clone(),
                }
            }
        };
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.teardown();
    }
}
