use clap::Args;
use taskboard_core::App;

use crate::utils::{
    command_error,
    display::{LogBuilder, LogType},
    session::open_dashboard,
};

#[derive(Args, Debug)]
pub struct Command {
    /// Id of the task to delete
    task_id: String,

    /// Don't ask for confirmation
    #[clap(short, long)]
    pub yes: bool,
}

pub async fn handle(command: Command, app: &App) -> command_error::Result<()> {
    open_dashboard(app).await?;

    let sync = app.synchronizer();
    let task = sync
        .find_task(&command.task_id)
        .map_err(command_error::Error::from_sync)?;

    let deleted = sync
        .delete(&task.id)
        .await
        .map_err(command_error::Error::from_sync)?;

    if deleted {
        LogBuilder::new(LogType::Success, "Task deleted")
            .with_branch("Title", task.title)
            .print();
    } else {
        LogBuilder::new(LogType::Info, "Nothing deleted").print();
    }
    Ok(())
}
