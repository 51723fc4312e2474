use clap::Args;
use taskboard_core::App;

use crate::utils::{
    command_error,
    display::{LogBuilder, LogType},
};

#[derive(Args, Debug)]
pub struct Command {
    #[clap(long)]
    email: String,

    /// At least 6 characters
    #[clap(long)]
    password: String,
}

pub async fn handle(command: Command, app: &App) -> command_error::Result<()> {
    let identity = app
        .identity_provider()
        .sign_up(&command.email, &command.password)
        .await
        .map_err(command_error::Error::from_identity)?;

    LogBuilder::new(LogType::Success, "Account created")
        .with_branch("Email", identity.email)
        .print();
    Ok(())
}
