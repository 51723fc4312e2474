use clap::Args;
use taskboard_core::App;

use crate::utils::{command_error, session::require_session};

#[derive(Args, Debug)]
pub struct Command {}

pub async fn handle(_: Command, app: &App) -> command_error::Result<()> {
    let identity = require_session(app)?;
    println!("{}", identity.email);
    Ok(())
}
