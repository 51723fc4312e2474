use clap::Parser;
use directories_next::ProjectDirs;
use std::path::PathBuf;
use taskboard_core::PromptBox;
use utils::{command_error, exit_code::ExitCode, prompt::TerminalPrompt};

mod commands;
mod tracing;

mod utils {
    pub mod command_error;
    pub mod display;
    pub mod exit_code;
    pub mod prompt;
    pub mod session;
}

// Note: for uniformity, we dont use clap `default_value` or `default_value_t` options
#[derive(Parser, Debug)]
#[command(
    name = "taskboard",
    version,
    long_about = Some("A minimal to-do list, one list per account.")
)]
struct Args {
    /// Profile to use
    #[arg(long)]
    profile_name: Option<String>,

    /// Path of configuration file (default: "~/.config/taskboard/config.toml")
    #[arg(short, long)]
    config: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: commands::Command,
}

impl Args {
    fn get_config_path(&self) -> eyre::Result<String> {
        let config_path = match &self.config {
            Some(x) => Ok(x.clone()),
            None => {
                if let Some(proj_dirs) = ProjectDirs::from("", "", "taskboard") {
                    let config_path: PathBuf = proj_dirs.config_dir().join("config.toml");

                    config_path
                        .to_str()
                        .map(|t| t.to_owned())
                        .ok_or_else(|| eyre::eyre!("couldn't convert os path to string"))
                } else {
                    Err(eyre::eyre!("Project directories could not be found."))
                }
            }
        }?;

        Ok(shellexpand::full(&config_path)?.into_owned())
    }
}

async fn run(args: Args) -> command_error::Result<()> {
    let config_path = args.get_config_path()?;
    let prompt = PromptBox::new(TerminalPrompt::new(args.command.assume_yes()));

    let app = taskboard_core::load(&config_path, args.profile_name.as_deref(), prompt)
        .await
        .map_err(|e| {
            command_error::Error::ExitWithError(
                ExitCode::ConfigError,
                e.wrap_err(format!("couldn't load the profile from '{config_path}'")),
            )
        })?;

    if let Err(e) = app.has_found_config_file() {
        ::tracing::debug!(reason = %e, "no config file, using defaults");
    }

    args.command.execute(&app).await
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = color_eyre::install() {
        eprintln!("{e:?}");
    }
    if let Err(e) = tracing::setup() {
        eprintln!("{e:?}");
    }

    match run(Args::parse()).await {
        Ok(()) => ExitCode::Success,
        Err(command_error::Error::ExitWithError(code, report)) => {
            eprintln!("{report:?}");
            code
        }
        Err(command_error::Error::Exit(code)) => code,
    }
}
