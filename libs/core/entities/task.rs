use patronus::patronus;
use serde_derive::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use typed_builder::TypedBuilder;

use crate::synchronizer::error::{self, SyncError};

pub type TaskId = String;

/// Field of a task document holding the owner identity
pub const OWNER_FIELD: &str = "userEmail";

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
#[strum(ascii_case_insensitive)]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

#[patronus(
    name = "TaskPatch",
    derives = "Default, Debug, Clone, PartialEq, Serialize"
)]
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    // assigned by the store, never written inside the document
    #[patronus(skip)]
    #[serde(default, skip_serializing)]
    #[builder(default, setter(into))]
    pub id: TaskId,
    #[builder(setter(into))]
    pub title: String,
    #[serde(default)]
    #[builder(default, setter(into))]
    pub description: String,
    #[serde(default)]
    #[builder(default)]
    pub priority: Priority,
    #[serde(default)]
    #[builder(default = false)]
    pub completed: bool,
    #[patronus(skip)]
    #[builder(setter(into))]
    pub user_email: String,
}

/// Editable part of a task
#[derive(Clone, Debug, Default, PartialEq, Eq, TypedBuilder)]
pub struct TaskForm {
    #[builder(default, setter(into))]
    pub title: String,
    #[builder(default, setter(into))]
    pub description: String,
    #[builder(default)]
    pub priority: Priority,
}

impl TaskForm {
    /// Title as typed, refused when blank
    pub fn validated_title(&self) -> error::Result<&str> {
        if self.title.trim().is_empty() {
            return Err(SyncError::EmptyTitle);
        }
        Ok(&self.title)
    }

    pub fn to_patch(&self) -> error::Result<TaskPatch> {
        Ok(TaskPatch::default()
            .set_title(self.validated_title()?)
            .set_description(self.description.clone())
            .set_priority(self.priority))
    }
}

impl From<&Task> for TaskForm {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
        }
    }
}
