use std::str::FromStr;

use clap::Args;
use taskboard_core::{App, Priority};

use crate::utils::{command_error, display::print_tasks, session::open_dashboard};

#[derive(Args, Debug)]
pub struct Command {
    /// Id of the task to edit
    task_id: String,

    #[clap(short, long)]
    title: Option<String>,

    /// An empty string clears the description
    #[clap(short, long)]
    description: Option<String>,

    #[clap(short, long, value_parser = Priority::from_str)]
    priority: Option<Priority>,
}

pub async fn handle(command: Command, app: &App) -> command_error::Result<()> {
    open_dashboard(app).await?;

    let sync = app.synchronizer();
    let task = sync
        .find_task(&command.task_id)
        .map_err(command_error::Error::from_sync)?;

    sync.begin_edit(&task);
    let mut form = sync.state().form;
    if let Some(title) = command.title {
        form.title = title;
    }
    if let Some(description) = command.description {
        form.description = description;
    }
    if let Some(priority) = command.priority {
        form.priority = priority;
    }
    sync.set_form(form);

    sync.submit()
        .await
        .map_err(command_error::Error::from_sync)?;

    print_tasks(&sync.state().tasks);
    Ok(())
}
