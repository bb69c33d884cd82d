// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Generation commands
//!
//! Commands: generate, validate

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::info;

use konductor_core::application::{GenerationPipeline, GenerationRequest};
use konductor_core::domain::generator::GenerateOptions;
use konductor_core::domain::generator_config::KonductorConfig;
use konductor_core::infrastructure::providers::ProviderRegistry;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Manifest files; resources from all files are merged
    #[arg(value_name = "MANIFEST_FILE", required = true)]
    pub manifests: Vec<PathBuf>,

    /// Provider to generate for (default: from configuration)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Output directory (default: from configuration)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Extra directory searched for tool source files (repeatable)
    #[arg(long = "tool-path", value_name = "DIR")]
    pub tool_paths: Vec<PathBuf>,

    /// Agent used as the entry point of the generated project
    #[arg(long, value_name = "NAME")]
    pub root_agent: Option<String>,

    /// Application name written into the generated entry point
    #[arg(long, value_name = "NAME")]
    pub app_name: Option<String>,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Manifest files; resources from all files are merged
    #[arg(value_name = "MANIFEST_FILE", required = true)]
    pub manifests: Vec<PathBuf>,

    /// Provider whose checks are applied (default: from configuration)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Extra directory searched for tool source files (repeatable)
    #[arg(long = "tool-path", value_name = "DIR")]
    pub tool_paths: Vec<PathBuf>,

    /// Agent used as the entry point of the generated project
    #[arg(long, value_name = "NAME")]
    pub root_agent: Option<String>,
}

pub fn generate(args: GenerateArgs, config_override: Option<PathBuf>) -> Result<()> {
    let config =
        KonductorConfig::load_or_default(config_override).context("Failed to load configuration")?;

    let provider = args
        .provider
        .unwrap_or_else(|| config.spec.default_provider.clone());
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| config.spec.output_dir.clone());
    let mut options = options(&config, args.tool_paths, args.root_agent);
    if let Some(app_name) = args.app_name {
        options = options.app_name(app_name);
    }

    let request = GenerationRequest::new(args.manifests, provider, output_dir).with_options(options);
    let mut pipeline = GenerationPipeline::new(Arc::new(ProviderRegistry::with_builtin_providers()?));
    let report = pipeline.generate(&request)?;
    info!("Pipeline finished: {}", pipeline.stage());

    println!(
        "{}",
        format!(
            "✓ Generated {} project in {}",
            report.provider,
            report.output_dir.display()
        )
        .green()
    );
    if let Some(root) = &report.root_agent {
        println!("  Root agent: {}", root.bold());
    }
    for file in &report.files {
        println!("  {}", file.display());
    }

    Ok(())
}

pub fn validate(args: ValidateArgs, config_override: Option<PathBuf>) -> Result<()> {
    let config =
        KonductorConfig::load_or_default(config_override).context("Failed to load configuration")?;

    let provider = args
        .provider
        .unwrap_or_else(|| config.spec.default_provider.clone());
    let options = options(&config, args.tool_paths, args.root_agent);

    let request =
        GenerationRequest::new(args.manifests, provider, config.spec.output_dir.clone())
            .with_options(options);
    let mut pipeline = GenerationPipeline::new(Arc::new(ProviderRegistry::with_builtin_providers()?));
    let report = pipeline.validate(&request)?;

    println!(
        "{}",
        format!("✓ Manifest is valid for provider '{}'", report.provider).green()
    );
    println!("  {}", report.summary);
    println!(
        "  Root agent: {}",
        report.root_agent.as_deref().unwrap_or("(none)")
    );
    if report.root_agents.len() > 1 {
        println!(
            "  {}",
            format!("Multiple root agents: {}", report.root_agents.join(", ")).yellow()
        );
    }
    println!("  Agents (dependency order): {}", report.agents.join(", "));

    Ok(())
}

/// CLI search paths come before configured ones
fn options(
    config: &KonductorConfig,
    tool_paths: Vec<PathBuf>,
    root_agent: Option<String>,
) -> GenerateOptions {
    let mut options = GenerateOptions::new().app_name(config.spec.app_name.clone());
    options.tool_search_paths = tool_paths;
    options
        .tool_search_paths
        .extend(config.spec.tool_search_paths.iter().cloned());
    if let Some(root) = root_agent {
        options = options.root_agent(root);
    }
    options
}
