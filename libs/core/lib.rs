use taskboard_identity::IdentityProviderBox;

pub mod app_store;
mod auth;
pub mod entities;
mod load;
pub mod prompt;
pub mod session_guard;
pub mod synchronizer;

pub use app_store::{AppStore, DashboardState, Phase, StateEvent};
pub use auth::ProviderAuthContext;
pub use entities::task::{Priority, Task, TaskForm, TaskId, TaskPatch};
pub use load::{load, load_from_config};
pub use prompt::{Prompt, PromptBox};
pub use session_guard::{GuardStatus, SessionGuard};
pub use synchronizer::{
    error::{Result as SyncResult, SyncError},
    TaskSynchronizer,
};

pub struct App {
    synchronizer: TaskSynchronizer,
    identity_provider: IdentityProviderBox,
    login_route: String,
    /// Ok - found | Err - not found with error reason
    found_config_file: Result<(), eyre::Error>,
}

impl App {
    /// Guard resolving the session this app runs for
    pub fn mount_guard(&self) -> SessionGuard {
        SessionGuard::mount(self.identity_provider.clone(), self.login_route.clone())
    }

    pub fn synchronizer(&self) -> &TaskSynchronizer {
        &self.synchronizer
    }

    pub fn identity_provider(&self) -> &IdentityProviderBox {
        &self.identity_provider
    }

    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    pub fn has_found_config_file(&self) -> &Result<(), eyre::Error> {
        &self.found_config_file
    }
}
