use std::sync::Arc;

use parking_lot::RwLock;
use taskboard_identity::{EventEmitter, EventListener, Identity};
use tracing::trace;

use crate::entities::task::{Task, TaskForm, TaskId};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    Error(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardState {
    pub identity: Option<Identity>,
    pub tasks: Vec<Task>,
    pub phase: Phase,
    pub form: TaskForm,
    /// Task being edited by the form, creating a new one when `None`
    pub editing: Option<TaskId>,
    /// Last failed mutation, cleared by the next successful load
    pub last_error: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StateEvent {
    SessionResolved(Identity),
    LoadStarted,
    LoadSucceeded(Vec<Task>),
    LoadFailed(String),
    MutationFailed(String),
    EditStarted { id: TaskId, form: TaskForm },
    EditCancelled,
    FormChanged(TaskForm),
    FormReset,
    /// A task was deleted from the store, ahead of the next load
    TaskRemoved(TaskId),
    SessionEnded,
}

impl DashboardState {
    pub fn apply(&mut self, event: StateEvent) {
        match event {
            StateEvent::SessionResolved(identity) => {
                if self.identity.as_ref() != Some(&identity) {
                    // tasks of a previous identity must not leak to the new one
                    *self = DashboardState {
                        identity: Some(identity),
                        ..Default::default()
                    };
                }
            }
            StateEvent::LoadStarted => self.phase = Phase::Loading,
            StateEvent::LoadSucceeded(tasks) => {
                self.tasks = tasks;
                self.phase = Phase::Ready;
                self.last_error = None;
            }
            StateEvent::LoadFailed(message) => self.phase = Phase::Error(message),
            StateEvent::MutationFailed(message) => self.last_error = Some(message),
            StateEvent::EditStarted { id, form } => {
                self.editing = Some(id);
                self.form = form;
            }
            StateEvent::EditCancelled => {
                self.editing = None;
                self.form = TaskForm::default();
            }
            StateEvent::FormChanged(form) => self.form = form,
            StateEvent::FormReset => self.form = TaskForm::default(),
            StateEvent::TaskRemoved(id) => {
                self.tasks.retain(|task| task.id != id);
                if self.editing.as_ref() == Some(&id) {
                    self.editing = None;
                    self.form = TaskForm::default();
                }
            }
            StateEvent::SessionEnded => *self = DashboardState::default(),
        }
    }

    pub fn find_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }
}

/// Shared dashboard state, changed only through [`StateEvent`]s.
#[derive(Clone, Default)]
pub struct AppStore {
    state: Arc<RwLock<DashboardState>>,
    emitter: EventEmitter<DashboardState>,
}

impl AppStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&self, event: StateEvent) {
        trace!(?event, "dispatch");
        let snapshot = {
            let mut state = self.state.write();
            state.apply(event);
            state.clone()
        };
        self.emitter.notify(&snapshot);
    }

    pub fn snapshot(&self) -> DashboardState {
        self.state.read().clone()
    }

    /// Receive a snapshot after every dispatched event
    pub fn subscribe(&self) -> EventListener<DashboardState> {
        self.emitter.subscribe()
    }

    pub fn unsubscribe(&self, listener_id: u64) {
        self.emitter.unsubscribe(listener_id);
    }
}
