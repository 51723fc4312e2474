use std::str::FromStr;

use clap::Args;
use taskboard_core::{App, Priority, TaskForm};

use crate::utils::{command_error, display::print_tasks, session::open_dashboard};

#[derive(Args, Debug)]
pub struct Command {
    title: String,

    #[clap(short, long)]
    description: Option<String>,

    /// low, medium or high (default: low)
    #[clap(short, long, value_parser = Priority::from_str)]
    priority: Option<Priority>,
}

pub async fn handle(command: Command, app: &App) -> command_error::Result<()> {
    open_dashboard(app).await?;

    let sync = app.synchronizer();
    sync.set_form(
        TaskForm::builder()
            .title(command.title)
            .description(command.description.unwrap_or_default())
            .priority(command.priority.unwrap_or_default())
            .build(),
    );
    sync.submit()
        .await
        .map_err(command_error::Error::from_sync)?;

    print_tasks(&sync.state().tasks);
    Ok(())
}
