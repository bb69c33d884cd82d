// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Konductor CLI
//!
//! The `konductor` binary turns YAML agent manifests into runnable projects
//! for a target agent framework.
//!
//! ## Commands
//!
//! - `konductor generate <manifest>...` - Parse, resolve and generate a project
//! - `konductor validate <manifest>...` - Run every check without writing output
//! - `konductor list-providers` - Registered providers, in registration order
//! - `konductor dependencies` - Dependency specifiers of a provider
//! - `konductor config show|validate|generate` - Configuration management
//!
//! Logs go to standard error; standard output carries only command results.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use konductor_cli::commands::{self, ConfigCommand, GenerateArgs, ValidateArgs};

/// Konductor - Manifest-driven code generation for agent frameworks
#[derive(Parser)]
#[command(name = "konductor")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "KONDUCTOR_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a project from one or more manifest files
    #[command(name = "generate")]
    Generate(GenerateArgs),

    /// Parse, resolve and check manifests without generating anything
    #[command(name = "validate")]
    Validate(ValidateArgs),

    /// List registered providers
    #[command(name = "list-providers")]
    ListProviders,

    /// Show the dependencies a provider's generated project needs
    #[command(name = "dependencies")]
    Dependencies {
        /// Provider name (default: from configuration)
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_level) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate(args) => commands::generate::generate(args, cli.config),
        Commands::Validate(args) => commands::generate::validate(args, cli.config),
        Commands::ListProviders => commands::provider::list_providers(),
        Commands::Dependencies { provider } => {
            commands::provider::dependencies(provider, cli.config)
        }
        Commands::Config { command } => commands::config::handle_command(command, cli.config),
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
