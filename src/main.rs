use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod build;
mod commands;
mod config;
mod i18n;

#[derive(Parser)]
struct Args {
    /// The command to execute
    #[command(subcommand)]
    command: MarginaliaCommand,
}

#[derive(Parser)]
struct BuildArgs {
    /// The path to the configuration file
    #[arg(short, long)]
    config_file: Option<PathBuf>,
}

#[derive(Parser)]
struct ServeArgs {
    /// The address to bind to
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// The port to bind to
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Open the site in the default browser
    #[arg(short, long, default_value = "false")]
    open: bool,

    /// The path to the configuration file
    #[arg(short, long)]
    config_file: Option<PathBuf>,
}

#[derive(Parser)]
struct CleanArgs {
    /// The path to the configuration file
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    /// Show what would be deleted without deleting it
    #[arg(long, default_value = "false")]
    dry_run: bool,
}

#[derive(Subcommand)]
enum MarginaliaCommand {
    /// Build the site
    Build(BuildArgs),

    /// Build the site and start a local preview server
    Serve(ServeArgs),

    /// Remove the output directory
    Clean(CleanArgs),
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    match args.command {
        MarginaliaCommand::Build(args) => {
            commands::build::run(&args).await?;
        }
        MarginaliaCommand::Serve(args) => {
            commands::serve::run(&args).await?;
        }
        MarginaliaCommand::Clean(args) => {
            commands::clean::run(&args).await?;
        }
    }

    Ok(())
}
