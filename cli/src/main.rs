// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Eka Care CLI
//!
//! The `ekacare` binary drives the Eka Care SDK end to end.
//!
//! ## Commands
//!
//! - `ekacare auth` - Log in and refresh tokens
//! - `ekacare upload|status` - EkaScribe audio upload and session results
//! - `ekacare demo` - Authenticate, upload and fetch results in one run
//! - `ekacare vitals` - Push vitals for a transaction
//! - `ekacare profile show|update|card|qr|delete` - ABDM profile
//! - `ekacare records upload|list|get|update|delete|fhir` - Health records
//! - `ekacare config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use ekacare_cli::commands::{
    self, AuthArgs, ConfigCommand, DemoArgs, ProfileCommand, RecordsCommand, StatusArgs,
    UploadArgs, VitalsArgs,
};

/// Eka Care CLI - Health platform SDK driver
#[derive(Parser)]
#[command(name = "ekacare")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery, which honours EKACARE_CONFIG_PATH)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "EKACARE_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, print tokens and refresh them
    #[command(name = "auth")]
    Auth(AuthArgs),

    /// Upload audio files for a transaction
    #[command(name = "upload")]
    Upload(UploadArgs),

    /// Fetch transcription session status
    #[command(name = "status")]
    Status(StatusArgs),

    /// Authenticate, upload and fetch results in one run
    #[command(name = "demo")]
    Demo(DemoArgs),

    /// Push vitals for a transaction
    #[command(name = "vitals")]
    Vitals(VitalsArgs),

    /// ABDM profile management
    #[command(name = "profile")]
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// Health records management
    #[command(name = "records")]
    Records {
        #[command(subcommand)]
        command: RecordsCommand,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is not an error
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    // Config commands run without credentials; everything else loads a client
    match cli.command {
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        Some(Commands::Auth(args)) => {
            commands::auth::handle(args, &commands::load_client(cli.config)?).await
        }
        Some(Commands::Upload(args)) => {
            commands::scribe::upload(args, &commands::load_client(cli.config)?)
                .await
                .map(|_| ())
        }
        Some(Commands::Status(args)) => {
            commands::scribe::status(args, &commands::load_client(cli.config)?).await
        }
        Some(Commands::Demo(args)) => {
            commands::scribe::demo(args, &commands::load_client(cli.config)?).await
        }
        Some(Commands::Vitals(args)) => {
            commands::vitals::handle(args, &commands::load_client(cli.config)?).await
        }
        Some(Commands::Profile { command }) => {
            commands::profile::handle_command(command, &commands::load_client(cli.config)?).await
        }
        Some(Commands::Records { command }) => {
            commands::records::handle_command(command, &commands::load_client(cli.config)?).await
        }
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    Ok(())
}
