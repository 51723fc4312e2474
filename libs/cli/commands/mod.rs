use clap::Subcommand;
use taskboard_core::App;

use crate::utils::command_error;

pub mod add;
pub mod delete;
pub mod edit;
pub mod list;
pub mod login;
pub mod logout;
pub mod signup;
pub mod toggle;
pub mod whoami;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account and sign in with it
    Signup(signup::Command),
    /// Sign in to an existing account
    Login(login::Command),
    /// Close the current session
    Logout(logout::Command),
    /// Print the signed-in account
    Whoami(whoami::Command),
    /// Show your tasks
    List(list::Command),
    /// Add a new task
    Add(add::Command),
    /// Change the title, description or priority of a task
    Edit(edit::Command),
    /// Mark a task as done, or as not done anymore
    Toggle(toggle::Command),
    /// Remove a task
    Delete(delete::Command),
}

impl Command {
    /// Confirmations are answered without asking
    pub fn assume_yes(&self) -> bool {
        matches!(self, Self::Delete(o) if o.yes)
    }

    pub async fn execute(self, app: &App) -> command_error::Result<()> {
        match self {
            Self::Signup(o) => signup::handle(o, app).await?,
            Self::Login(o) => login::handle(o, app).await?,
            Self::Logout(o) => logout::handle(o, app).await?,
            Self::Whoami(o) => whoami::handle(o, app).await?,
            Self::List(o) => list::handle(o, app).await?,
            Self::Add(o) => add::handle(o, app).await?,
            Self::Edit(o) => edit::handle(o, app).await?,
            Self::Toggle(o) => toggle::handle(o, app).await?,
            Self::Delete(o) => delete::handle(o, app).await?,
        };

        Ok(())
    }
}
