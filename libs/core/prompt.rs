use std::sync::Arc;

use derive_more::Deref;

/// Interaction with the person driving the dashboard
pub trait Prompt: Send + Sync {
    /// Ask a yes/no question
    fn confirm(&self, message: &str) -> bool;

    fn notify(&self, message: &str);
}

#[derive(Deref, Clone)]
#[deref(forward)]
pub struct PromptBox(Arc<dyn Prompt>);

impl PromptBox {
    pub fn new(prompt: impl Prompt + 'static) -> Self {
        Self(Arc::new(prompt))
    }
}
