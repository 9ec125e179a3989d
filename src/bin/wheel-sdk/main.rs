//! wheel-sdk CLI - VTK wheel SDK dependency resolver

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wheel_sdk::SdkError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        match e.downcast_ref::<SdkError>() {
            Some(sdk_error) => eprint!("{}", sdk_error.to_diagnostic()),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.global.verbose {
        EnvFilter::new("wheel_sdk=debug")
    } else {
        EnvFilter::new("wheel_sdk=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Platform(args) => commands::platform::execute(args, &cli.global),
        Commands::Fetch(args) => commands::fetch::execute(args, &cli.global),
        Commands::Args(args) => commands::args::execute(args, &cli.global),
        Commands::Build(args) => commands::build::execute(args, &cli.global),
        Commands::Clean(args) => commands::clean::execute(args, &cli.global),
    }
}
