use clap::Args;
use taskboard_core::App;

use crate::utils::{
    command_error,
    display::{LogBuilder, LogType},
    session::open_dashboard,
};

#[derive(Args, Debug)]
pub struct Command {
    /// Id of the task to toggle
    task_id: String,
}

pub async fn handle(command: Command, app: &App) -> command_error::Result<()> {
    open_dashboard(app).await?;

    let sync = app.synchronizer();
    let task = sync
        .find_task(&command.task_id)
        .map_err(command_error::Error::from_sync)?;
    let completed = sync
        .toggle_complete(&task)
        .await
        .map_err(command_error::Error::from_sync)?;

    let message = if completed {
        "Task completed"
    } else {
        "Task reopened"
    };
    LogBuilder::new(LogType::Success, message)
        .with_branch("Id", task.id)
        .with_branch("Title", task.title)
        .print();
    Ok(())
}
