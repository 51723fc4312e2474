use clap::Args;
use taskboard_core::App;

use crate::utils::{
    command_error,
    display::{LogBuilder, LogType},
};

#[derive(Args, Debug)]
pub struct Command {}

pub async fn handle(_: Command, app: &App) -> command_error::Result<()> {
    let route = app
        .synchronizer()
        .logout()
        .await
        .map_err(command_error::Error::from_sync)?;

    LogBuilder::new(LogType::Info, "Signed out")
        .with_branch("Redirect", route)
        .print();
    Ok(())
}
