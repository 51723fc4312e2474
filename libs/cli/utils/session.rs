use std::time::Duration;

use colored::Colorize;
use taskboard_core::{App, GuardStatus};
use taskboard_identity::Identity;

use crate::utils::{command_error, exit_code::ExitCode};

const SESSION_TIMEOUT: Duration = Duration::from_secs(2);

/// Resolve the session and load its tasks, or send the user to the login route
pub async fn open_dashboard(app: &App) -> command_error::Result<Identity> {
    let identity = require_session(app)?;
    app.synchronizer()
        .load(&identity)
        .await
        .map_err(command_error::Error::from_sync)?;
    Ok(identity)
}

pub fn require_session(app: &App) -> command_error::Result<Identity> {
    let mut guard = app.mount_guard();
    match guard.wait(SESSION_TIMEOUT) {
        GuardStatus::Ready(identity) => Ok(identity),
        GuardStatus::Redirect { route } => {
            print_redirect(&route);
            Err(command_error::Error::Exit(ExitCode::PermissionDenied))
        }
        GuardStatus::Pending => Err(eyre::eyre!("couldn't resolve the current session").into()),
    }
}

pub fn print_redirect(route: &str) {
    eprintln!(
        "{} not signed in, redirecting to {}\n  run `{}` first",
        "!".yellow().bold(),
        route.bold(),
        "taskboard login --email <email> --password <password>".cyan()
    );
}
