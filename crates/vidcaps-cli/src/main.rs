// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

mod devices;
mod error;
mod inspect;
mod snapshot;

use clap::{Parser, Subcommand};
use error::result_to_exit_code;
use std::process::ExitCode;

/// vidcaps CLI - V4L2 camera discovery and capability reporting tool
#[derive(Parser)]
#[command(name = "vidcaps")]
#[command(version)]
#[command(about = "vidcaps CLI - V4L2 camera discovery and capability reporting tool")]
#[command(long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (use RUST_LOG=debug for more)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report capabilities and supported formats for every video device
    Inspect(inspect::Args),

    /// List discovered video character devices
    Devices(devices::Args),

    /// Record a capability snapshot as a JSON document
    Snapshot(snapshot::Args),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbose, cli.quiet);

    // Execute the subcommand and convert result to exit code
    let result = match cli.command {
        Commands::Inspect(args) => inspect::execute(args),
        Commands::Devices(args) => devices::execute(args, cli.json),
        Commands::Snapshot(args) => snapshot::execute(args),
    };

    result_to_exit_code(result)
}

/// Initialize env_logger based on verbosity flags
fn init_logging(verbose: bool, quiet: bool) {
    // Determine log level from flags or RUST_LOG environment variable
    let env = env_logger::Env::default();

    let env = if quiet {
        // Quiet mode: only show errors
        env.default_filter_or("error")
    } else if verbose {
        // Verbose mode: show debug messages
        env.default_filter_or("debug")
    } else {
        // Default: show warnings and above; the report itself goes to stdout
        env.default_filter_or("warn")
    };

    env_logger::Builder::from_env(env)
        .format_timestamp(None) // Disable timestamps for cleaner CLI output
        .format_target(false) // Disable target (module path) for cleaner output
        .init();

    log::debug!("Logging initialized");
}
