use std::sync::Arc;

use derive_more::Deref;
use taskboard_document_store::{to_fields, Collection, Filter, StoreError};
use taskboard_identity::{Identity, IdentityProviderBox};
use tracing::{debug, info, warn};
use typed_builder::TypedBuilder;

use crate::{
    app_store::{AppStore, DashboardState, StateEvent},
    entities::task::{Task, TaskForm, TaskId, TaskPatch, OWNER_FIELD},
    prompt::PromptBox,
};

pub mod error;

use error::SyncError;

const DEFAULT_LOGIN_ROUTE: &str = "/login";

/// Keeps the dashboard state in line with the signed-in user's tasks. Every
/// mutation is written to the collection and followed by a full reload.
#[derive(TypedBuilder)]
#[builder(build_method(into = TaskSynchronizer))]
pub struct TaskSynchronizerInner {
    collection: Collection,
    identity_provider: IdentityProviderBox,
    #[builder(default)]
    store: AppStore,
    prompt: PromptBox,
    #[builder(default = DEFAULT_LOGIN_ROUTE.to_owned(), setter(into))]
    login_route: String,
}

#[derive(Clone, Deref)]
#[deref(forward)]
pub struct TaskSynchronizer(Arc<TaskSynchronizerInner>);

impl TaskSynchronizer {
    pub fn builder() -> TaskSynchronizerInnerBuilder {
        TaskSynchronizerInner::builder()
    }
}

impl From<TaskSynchronizerInner> for TaskSynchronizer {
    fn from(inner: TaskSynchronizerInner) -> Self {
        TaskSynchronizer(Arc::new(inner))
    }
}

impl TaskSynchronizerInner {
    pub fn state(&self) -> DashboardState {
        self.store.snapshot()
    }

    fn current_identity(&self) -> error::Result<Identity> {
        self.store.snapshot().identity.ok_or(SyncError::NoSession)
    }

    /// Task of the current list, as of the last load
    pub fn find_task(&self, id: &str) -> error::Result<Task> {
        self.store
            .snapshot()
            .find_task(id)
            .cloned()
            .ok_or_else(|| SyncError::TaskNotFound(id.to_owned()))
    }

    /// Replace the task list with every task owned by `identity`
    pub async fn load(&self, identity: &Identity) -> error::Result<Vec<Task>> {
        self.store
            .dispatch(StateEvent::SessionResolved(identity.clone()));
        self.store.dispatch(StateEvent::LoadStarted);

        match self.fetch(identity).await {
            Ok(tasks) => {
                debug!(email = %identity.email, count = tasks.len(), "tasks loaded");
                self.store.dispatch(StateEvent::LoadSucceeded(tasks.clone()));
                Ok(tasks)
            }
            Err(e) => {
                warn!(email = %identity.email, error = %e, "failed to load tasks");
                self.store.dispatch(StateEvent::LoadFailed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Documents that don't read back as a task are left out of the list
    async fn fetch(&self, identity: &Identity) -> error::Result<Vec<Task>> {
        let filter = Filter::field_eq(OWNER_FIELD, identity.email.clone());
        let documents = self.collection.query(&filter).await?;

        Ok(documents
            .into_iter()
            .filter_map(|document| match document.parse::<Task>() {
                Ok(task) => Some(task),
                Err(e) => {
                    warn!(error = %e, "skipping undecodable task");
                    None
                }
            })
            .collect())
    }

    async fn reload(&self) -> error::Result<()> {
        let identity = self.current_identity()?;
        self.load(&identity).await?;
        Ok(())
    }

    pub async fn create(&self, form: &TaskForm) -> error::Result<TaskId> {
        let id = self
            .insert_task(form)
            .await
            .inspect_err(|e| self.mutation_failed(e))?;

        info!(id = %id, "task added");
        self.prompt.notify("Task added!");
        self.store.dispatch(StateEvent::FormReset);
        self.reload().await?;
        Ok(id)
    }

    async fn insert_task(&self, form: &TaskForm) -> error::Result<TaskId> {
        let identity = self.current_identity()?;
        let task = Task::builder()
            .title(form.validated_title()?)
            .description(form.description.clone())
            .priority(form.priority)
            .user_email(identity.email)
            .build();

        Ok(self.collection.insert(to_fields(&task)?).await?)
    }

    /// Overwrite the editable fields of task `id` with `form`
    pub async fn update(&self, id: &str, form: &TaskForm) -> error::Result<()> {
        self.write_form(id, form)
            .await
            .inspect_err(|e| self.mutation_failed(e))?;

        info!(id, "task updated");
        self.prompt.notify("Task updated!");
        self.store.dispatch(StateEvent::EditCancelled);
        self.reload().await
    }

    async fn write_form(&self, id: &str, form: &TaskForm) -> error::Result<()> {
        self.current_identity()?;
        self.patch_task(id, &form.to_patch()?).await
    }

    /// Flip the completion flag of `task`, returns the new value
    pub async fn toggle_complete(&self, task: &Task) -> error::Result<bool> {
        let completed = !task.completed;
        let patch = TaskPatch::default().set_completed(completed);

        async {
            self.current_identity()?;
            Ok::<_, SyncError>(self.patch_task(&task.id, &patch).await?)
        }
        .await
        .inspect_err(|e| self.mutation_failed(e))?;

        info!(id = %task.id, completed, "task toggled");
        self.reload().await?;
        Ok(completed)
    }

    async fn patch_task(&self, id: &str, patch: &TaskPatch) -> error::Result<()> {
        if patch.is_empty() {
            return Ok(());
        }

        match self.collection.update(id, to_fields(patch)?).await {
            Err(StoreError::NotFound { .. }) => Err(SyncError::TaskNotFound(id.to_owned())),
            result => Ok(result?),
        }
    }

    /// Delete task `id` once confirmed, returns false when the deletion was declined
    pub async fn delete(&self, id: &str) -> error::Result<bool> {
        if !self.prompt.confirm("Delete this task?") {
            debug!(id, "deletion declined");
            return Ok(false);
        }

        async {
            self.current_identity()?;
            Ok::<_, SyncError>(self.collection.delete(id).await?)
        }
        .await
        .inspect_err(|e| self.mutation_failed(e))?;

        info!(id, "task deleted");
        self.store.dispatch(StateEvent::TaskRemoved(id.to_owned()));
        self.reload().await?;
        Ok(true)
    }

    /// Load `task` in the form, the next submit updates it
    pub fn begin_edit(&self, task: &Task) {
        self.store.dispatch(StateEvent::EditStarted {
            id: task.id.clone(),
            form: TaskForm::from(task),
        });
    }

    pub fn cancel_edit(&self) {
        self.store.dispatch(StateEvent::EditCancelled);
    }

    pub fn set_form(&self, form: TaskForm) {
        self.store.dispatch(StateEvent::FormChanged(form));
    }

    /// Save the form: updates the task being edited, creates a task otherwise
    pub async fn submit(&self) -> error::Result<TaskId> {
        let state = self.store.snapshot();
        match state.editing {
            Some(id) => {
                self.update(&id, &state.form).await?;
                Ok(id)
            }
            None => self.create(&state.form).await,
        }
    }

    /// Close the session, returns the route to send the user to
    pub async fn logout(&self) -> error::Result<String> {
        self.identity_provider.sign_out().await?;
        self.store.dispatch(StateEvent::SessionEnded);

        info!("signed out");
        Ok(self.login_route.clone())
    }

    fn mutation_failed(&self, error: &SyncError) {
        warn!(error = %error, "task mutation failed");
        self.store
            .dispatch(StateEvent::MutationFailed(error.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use parking_lot::Mutex;
    use serde_json::json;
    use taskboard_document_store::{
        stores::in_memory::InMemoryStore, AccessRule, AccessRules, DocumentStoreBox, Fields,
        SecuredStore,
    };
    use taskboard_identity::LocalIdentityProvider;

    use super::*;
    use crate::{
        app_store::Phase, auth::ProviderAuthContext, entities::task::Priority, prompt::Prompt,
    };

    #[derive(Clone)]
    struct FakePrompt {
        answer: Arc<AtomicBool>,
        notices: Arc<Mutex<Vec<String>>>,
    }

    impl FakePrompt {
        fn new() -> Self {
            Self {
                answer: Arc::new(AtomicBool::new(true)),
                notices: Default::default(),
            }
        }

        fn answer(&self, yes: bool) {
            self.answer.store(yes, Ordering::SeqCst);
        }

        fn notices(&self) -> Vec<String> {
            self.notices.lock().clone()
        }
    }

    impl Prompt for FakePrompt {
        fn confirm(&self, _message: &str) -> bool {
            self.answer.load(Ordering::SeqCst)
        }

        fn notify(&self, message: &str) {
            self.notices.lock().push(message.to_owned());
        }
    }

    struct Setup {
        sync: TaskSynchronizer,
        provider: IdentityProviderBox,
        prompt: FakePrompt,
    }

    fn setup() -> Setup {
        let provider = IdentityProviderBox::new(LocalIdentityProvider::in_memory());
        let rules = AccessRules::new().with_rule("tasks", AccessRule::owner_field(OWNER_FIELD));
        let store = SecuredStore::new(
            InMemoryStore::new(),
            rules,
            Arc::new(ProviderAuthContext::new(provider.clone())),
        );
        let prompt = FakePrompt::new();

        let sync = TaskSynchronizer::builder()
            .collection(Collection::new(DocumentStoreBox::new(store), "tasks"))
            .identity_provider(provider.clone())
            .prompt(PromptBox::new(prompt.clone()))
            .build();

        Setup {
            sync,
            provider,
            prompt,
        }
    }

    async fn signed_in(setup: &Setup, email: &str) -> Identity {
        let identity = setup.provider.sign_up(email, "secret1").await.unwrap();
        setup.sync.load(&identity).await.unwrap();
        identity
    }

    fn form(title: &str, priority: Priority) -> TaskForm {
        TaskForm::builder().title(title).priority(priority).build()
    }

    #[tokio::test]
    async fn created_task_shows_up_after_reload() -> eyre::Result<()> {
        let s = setup();
        let ada = signed_in(&s, "ada@example.com").await;

        s.sync.set_form(form("Buy milk", Priority::Medium));
        let id = s.sync.submit().await?;

        let state = s.sync.state();
        assert_eq!(state.phase, Phase::Ready);
        assert_eq!(state.form, TaskForm::default());
        let task = state.find_task(&id).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.priority, Priority::Medium);
        assert!(!task.completed);
        assert_eq!(task.user_email, ada.email);
        assert_eq!(s.prompt.notices(), vec!["Task added!".to_owned()]);

        let reloaded = s.sync.load(&ada).await?;
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].id, id);
        Ok(())
    }

    #[tokio::test]
    async fn create_needs_a_session_and_a_title() -> eyre::Result<()> {
        let s = setup();
        let err = s.sync.create(&form("Buy milk", Priority::Low)).await.unwrap_err();
        assert!(matches!(err, SyncError::NoSession));

        let ada = signed_in(&s, "ada@example.com").await;
        let err = s.sync.create(&form("   ", Priority::Low)).await.unwrap_err();
        assert!(matches!(err, SyncError::EmptyTitle));
        assert!(s.sync.state().last_error.is_some());

        assert!(s.sync.load(&ada).await?.is_empty());
        assert!(s.prompt.notices().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn toggle_complete_flips_the_flag() -> eyre::Result<()> {
        let s = setup();
        signed_in(&s, "ada@example.com").await;
        let id = s.sync.create(&form("Buy milk", Priority::Low)).await?;

        let task = s.sync.find_task(&id)?;
        assert!(s.sync.toggle_complete(&task).await?);
        assert!(s.sync.find_task(&id)?.completed);

        let task = s.sync.find_task(&id)?;
        assert!(!s.sync.toggle_complete(&task).await?);
        assert!(!s.sync.find_task(&id)?.completed);
        Ok(())
    }

    #[tokio::test]
    async fn update_only_changes_editable_fields() -> eyre::Result<()> {
        let s = setup();
        let ada = signed_in(&s, "ada@example.com").await;
        let id = s.sync.create(&form("Buy milk", Priority::Low)).await?;
        s.sync.toggle_complete(&s.sync.find_task(&id)?).await?;

        s.sync.begin_edit(&s.sync.find_task(&id)?);
        let state = s.sync.state();
        assert_eq!(state.editing.as_deref(), Some(id.as_str()));
        assert_eq!(state.form.title, "Buy milk");

        s.sync.set_form(
            TaskForm::builder()
                .title("Buy oat milk")
                .description("the barista one")
                .priority(Priority::High)
                .build(),
        );
        assert_eq!(s.sync.submit().await?, id);

        let state = s.sync.state();
        assert_eq!(state.editing, None);
        assert_eq!(state.form, TaskForm::default());

        let task = s.sync.find_task(&id)?;
        assert_eq!(task.title, "Buy oat milk");
        assert_eq!(task.description, "the barista one");
        assert_eq!(task.priority, Priority::High);
        assert!(task.completed);
        assert_eq!(task.user_email, ada.email);
        assert_eq!(
            s.prompt.notices(),
            vec!["Task added!".to_owned(), "Task updated!".to_owned()]
        );
        Ok(())
    }

    #[tokio::test]
    async fn cancel_edit_goes_back_to_creating() -> eyre::Result<()> {
        let s = setup();
        signed_in(&s, "ada@example.com").await;
        let id = s.sync.create(&form("Buy milk", Priority::Low)).await?;

        s.sync.begin_edit(&s.sync.find_task(&id)?);
        s.sync.cancel_edit();
        s.sync.set_form(form("Walk the dog", Priority::Low));
        let other = s.sync.submit().await?;

        assert_ne!(other, id);
        assert_eq!(s.sync.state().tasks.len(), 2);
        assert_eq!(s.sync.find_task(&id)?.title, "Buy milk");
        Ok(())
    }

    #[tokio::test]
    async fn update_of_a_missing_task() {
        let s = setup();
        signed_in(&s, "ada@example.com").await;

        let err = s
            .sync
            .update("01HZZZZZZZZZZZZZZZZZZZZZZZ", &form("x", Priority::Low))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::TaskNotFound(_)));
    }

    #[tokio::test]
    async fn delete_asks_first() -> eyre::Result<()> {
        let s = setup();
        let ada = signed_in(&s, "ada@example.com").await;
        let id = s.sync.create(&form("Buy milk", Priority::Low)).await?;

        s.prompt.answer(false);
        assert!(!s.sync.delete(&id).await?);
        assert!(s.sync.find_task(&id).is_ok());

        s.prompt.answer(true);
        assert!(s.sync.delete(&id).await?);
        assert!(matches!(
            s.sync.find_task(&id),
            Err(SyncError::TaskNotFound(_))
        ));
        assert!(s.sync.load(&ada).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn deleting_the_edited_task_leaves_edit_mode() -> eyre::Result<()> {
        let s = setup();
        signed_in(&s, "ada@example.com").await;
        let id = s.sync.create(&form("Buy milk", Priority::Low)).await?;

        s.sync.begin_edit(&s.sync.find_task(&id)?);
        s.sync.delete(&id).await?;
        assert_eq!(s.sync.state().editing, None);
        Ok(())
    }

    #[tokio::test]
    async fn title_is_stored_as_typed() -> eyre::Result<()> {
        let s = setup();
        signed_in(&s, "ada@example.com").await;

        let id = s.sync.create(&form("  Buy milk ", Priority::Low)).await?;
        assert_eq!(s.sync.find_task(&id)?.title, "  Buy milk ");
        Ok(())
    }

    #[tokio::test]
    async fn foreign_documents_dont_break_the_list() -> eyre::Result<()> {
        let s = setup();
        let ada = signed_in(&s, "ada@example.com").await;
        let id = s.sync.create(&form("Buy milk", Priority::Low)).await?;

        let fields: Fields = serde_json::from_value(json!({
            "title": "Written elsewhere",
            "priority": "Urgent",
            "userEmail": "ada@example.com",
        }))?;
        let foreign = s.sync.collection.insert(fields).await?;

        let tasks = s.sync.load(&ada).await?;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, id);
        assert_eq!(s.sync.state().phase, Phase::Ready);

        assert!(s.sync.delete(&id).await?);
        let state = s.sync.state();
        assert!(state.find_task(&id).is_none());
        assert_eq!(state.phase, Phase::Ready);

        // still in the store, just not listed
        let stored = s.sync.collection.query(&Filter::All).await?;
        assert!(stored.iter().any(|document| document.id == foreign));
        Ok(())
    }

    #[tokio::test]
    async fn tasks_stay_with_their_owner() -> eyre::Result<()> {
        let s = setup();
        signed_in(&s, "ada@example.com").await;
        let id = s.sync.create(&form("Ada's task", Priority::Low)).await?;
        let adas_task = s.sync.find_task(&id)?;

        let bob = signed_in(&s, "bob@example.com").await;
        assert!(s.sync.state().tasks.is_empty());
        s.sync.create(&form("Bob's task", Priority::Low)).await?;

        let tasks = s.sync.load(&bob).await?;
        assert_eq!(tasks.len(), 1);
        assert!(tasks.iter().all(|t| t.user_email == bob.email));

        // the store refuses, whatever the client sends
        let err = s.sync.toggle_complete(&adas_task).await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::Store(StoreError::PermissionDenied(_))
        ));
        let state = s.sync.state();
        assert_eq!(state.tasks.len(), 1);
        assert!(state.last_error.is_some());

        let err = s.sync.delete(&adas_task.id).await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::Store(StoreError::PermissionDenied(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn failed_load_moves_to_error() -> eyre::Result<()> {
        let s = setup();
        let ada = signed_in(&s, "ada@example.com").await;
        s.provider.sign_out().await?;

        let err = s.sync.load(&ada).await.unwrap_err();
        assert!(matches!(err, SyncError::Store(StoreError::Unauthenticated)));
        assert!(matches!(s.sync.state().phase, Phase::Error(_)));
        Ok(())
    }

    #[tokio::test]
    async fn logout_clears_everything() -> eyre::Result<()> {
        let s = setup();
        signed_in(&s, "ada@example.com").await;
        s.sync.create(&form("Buy milk", Priority::Low)).await?;

        assert_eq!(s.sync.logout().await?, "/login");
        assert_eq!(s.sync.state(), DashboardState::default());
        assert!(s.provider.current_identity().is_none());

        let err = s.sync.create(&form("Buy milk", Priority::Low)).await.unwrap_err();
        assert!(matches!(err, SyncError::NoSession));
        Ok(())
    }
}
