// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Provider commands
//!
//! Commands: list-providers, dependencies

use std::path::PathBuf;

use anyhow::{Context, Result};

use konductor_core::domain::generator_config::KonductorConfig;
use konductor_core::infrastructure::providers::ProviderRegistry;

/// One provider name per line, in registration order
pub fn list_providers() -> Result<()> {
    let registry = ProviderRegistry::with_builtin_providers()?;
    for name in registry.list() {
        println!("{}", name);
    }
    Ok(())
}

/// One dependency specifier per line; nothing for providers without dependencies
pub fn dependencies(provider: Option<String>, config_override: Option<PathBuf>) -> Result<()> {
    let provider = match provider {
        Some(provider) => provider,
        None => {
            KonductorConfig::load_or_default(config_override)
                .context("Failed to load configuration")?
                .spec
                .default_provider
        }
    };

    let registry = ProviderRegistry::with_builtin_providers()?;
    let generator = registry.get(&provider)?;
    for dependency in generator.required_dependencies() {
        println!("{}", dependency);
    }
    Ok(())
}
