use clap::Args;
use colored::Colorize;
use taskboard_core::App;

use crate::utils::{command_error, display::print_tasks, session::open_dashboard};

#[derive(Args, Debug)]
pub struct Command {}

pub async fn handle(_: Command, app: &App) -> command_error::Result<()> {
    let identity = open_dashboard(app).await?;

    println!("Hello, {}\n", identity.email.bold());
    print_tasks(&app.synchronizer().state().tasks);
    Ok(())
}
