//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::commands;
use crate::output::OutputContext;

/// Install mitamae on a freshly built machine and apply a recipe
#[derive(Parser)]
#[command(
    name = "mitamae-provisioner",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format (validate, platform and version)
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Detect the platform, install mitamae and apply the recipe
    Provision(commands::provision::ProvisionArgs),

    /// Check the configuration without contacting a target
    Validate(commands::validate::ValidateArgs),

    /// Show the target platform and the matching mitamae release
    Platform(commands::platform::PlatformArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            json,
            quiet,
            no_color,
            command,
            ..
        } = self;
        let ctx = OutputContext::new(no_color, quiet);
        match command {
            Command::Provision(_) if json => {
                anyhow::bail!("--json is not supported by provision; its output is a live log")
            }
            Command::Provision(args) => commands::provision::run(&ctx, &args).await,
            Command::Validate(args) => commands::validate::run(&ctx, &args, json),
            Command::Platform(args) => commands::platform::run(&ctx, &args, json).await,
            Command::Version => {
                commands::version::run(json);
                Ok(())
            }
        }
    }
}
